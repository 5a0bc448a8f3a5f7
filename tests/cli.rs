use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PURCHASES: &str = r#"[
  {"purchaseHistory": {"doc": {"title": "Free app", "documentType": "Android Apps"}, "invoicePrice": "$0.00"}},
  {"purchaseHistory": {"doc": {"title": "Game", "documentType": "Android Apps"}, "invoicePrice": "$4.99", "paymentMethodTitle": "Visa-1234"}},
  {"purchaseHistory": {"doc": {"title": "Book"}, "invoicePrice": "$4.99"}}
]"#;

const POINTS: &str = r#"[
  {"playPointsDetails": {"membership": {"level": "Gold", "pointsBalance": "500"}}},
  {"playPointsDetails": {"pointsHistory": {"transactionId": "t1", "category": "Points used", "pointsChange": "-100"}}}
]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config");
        std::fs::create_dir_all(&config).unwrap();
        std::fs::write(config.join("settings.json"), r#"{"color": false}"#).unwrap();
        Self { dir }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("playledger").unwrap();
        cmd.env("PLAYLEDGER_CONFIG_DIR", self.config_dir())
            .env_remove("RUST_LOG");
        cmd
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_summary_reports_detected_types() {
    let ws = Workspace::new();
    let purchases = ws.file("export-1.json", PURCHASES);
    let points = ws.file("anything.txt", POINTS);

    ws.cmd()
        .args(["summary", arg(&purchases), arg(&points)])
        .assert()
        .success()
        .stderr(predicate::str::contains("detected as Purchase history"))
        .stderr(predicate::str::contains("detected as Play Points membership"))
        .stdout(predicate::str::contains("Initial view: Membership"))
        .stdout(predicate::str::contains(
            "Available views: Membership, Points History, Purchase History",
        ));
}

#[test]
fn test_view_filters_and_totals() {
    let ws = Workspace::new();
    let purchases = ws.file("p.json", PURCHASES);

    ws.cmd()
        .args(["view", arg(&purchases), "--view", "purchases", "--filter", "Other"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 1 of 3 purchases"))
        .stdout(predicate::str::contains("Categories: Android Apps, Other"))
        .stdout(predicate::str::contains("Total spent: $9.98"));
}

#[test]
fn test_view_search_is_case_insensitive() {
    let ws = Workspace::new();
    let purchases = ws.file("p.json", PURCHASES);

    ws.cmd()
        .args(["view", arg(&purchases), "--search", "VISA"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Game"))
        .stdout(predicate::str::contains("Showing 1 of 3 purchases"));
}

#[test]
fn test_total_invoice_price() {
    let ws = Workspace::new();
    let purchases = ws.file("p.json", PURCHASES);

    ws.cmd()
        .args(["total", arg(&purchases), "--projection", "invoice-price"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total spent: $9.98"));
}

#[test]
fn test_total_points_spent() {
    let ws = Workspace::new();
    let points = ws.file("points.json", POINTS);

    ws.cmd()
        .args(["total", arg(&points), "--projection", "points-spent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Points spent: 100"));
}

#[test]
fn test_unrecognized_file_is_rejected_but_others_load() {
    let ws = Workspace::new();
    let mystery = ws.file("mystery.json", r#"[{"foo": "bar"}]"#);
    let purchases = ws.file("p.json", PURCHASES);

    ws.cmd()
        .args(["total", arg(&mystery), arg(&purchases), "--projection", "invoice-price"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not detect data type"))
        .stdout(predicate::str::contains("$9.98"));
}

#[test]
fn test_no_data_submitted() {
    let ws = Workspace::new();
    let broken = ws.file("broken.json", "{ not json");

    ws.cmd()
        .args(["view", arg(&broken)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON file"))
        .stderr(predicate::str::contains("Error: Please load at least one JSON file"));
}

#[test]
fn test_total_for_unloaded_view_is_zero() {
    let ws = Workspace::new();
    let purchases = ws.file("p.json", PURCHASES);

    // No orders loaded, so the order total is simply zero.
    ws.cmd()
        .args(["total", arg(&purchases), "--projection", "order-total"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Order total: $0.00"));
}

#[test]
fn test_export_writes_csv() {
    let ws = Workspace::new();
    let purchases = ws.file("p.json", PURCHASES);
    let out = ws.dir.path().join("out").join("purchases.csv");

    ws.cmd()
        .args([
            "export",
            arg(&purchases),
            "--view",
            "purchases",
            "--filter",
            "Android Apps",
            "--output",
            arg(&out),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 purchases"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Title,Type,Price,Payment,Country,Language");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Free app"));
    assert!(lines[1].contains("Free"));
}

#[test]
fn test_config_roundtrip() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["config", "--date-format", "%Y-%m-%d"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"));

    ws.cmd()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"date_format\": \"%Y-%m-%d\""))
        .stdout(predicate::str::contains("\"color\": false"));

    ws.cmd()
        .args(["config", "--date-format", "%Q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date format"));
}

#[test]
fn test_bad_date_format_in_settings_file_falls_back() {
    let ws = Workspace::new();
    std::fs::write(
        ws.config_dir().join("settings.json"),
        r#"{"date_format": "%Q", "color": false}"#,
    )
    .unwrap();
    let purchases = ws.file(
        "p.json",
        r#"[{"purchaseHistory": {"doc": {"title": "Chess"}, "invoicePrice": "$1.00", "purchaseTime": "2024-03-05T10:00:00Z"}}]"#,
    );

    ws.cmd()
        .args(["view", arg(&purchases)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mar 5, 2024"));
}

#[test]
fn test_completions() {
    Command::cargo_bin("playledger")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("playledger"));
}
