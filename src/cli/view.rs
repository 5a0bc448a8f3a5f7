use std::path::PathBuf;

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Table};

use super::load::load_files;
use crate::error::Result;
use crate::fmt;
use crate::query::CategoryFilter;
use crate::session::Session;
use crate::settings::load_settings;
use crate::table::{headers, rows, Field, Tone};
use crate::views::ViewId;

pub fn run(
    files: &[PathBuf],
    view: Option<ViewId>,
    filter: &CategoryFilter,
    search: &str,
) -> Result<()> {
    let session = load_files(files);
    session.require_data()?;
    let settings = load_settings();
    let view = view.unwrap_or_else(|| session.initial_view());
    println!(
        "{}",
        format_view(&session, view, filter, search, &settings.date_format, Utc::now())
    );
    Ok(())
}

fn paint(field: &Field) -> ColoredString {
    let text = field.text.as_str();
    match field.tone {
        Tone::Plain => text.normal(),
        Tone::Positive => text.green(),
        Tone::Negative => text.red(),
        Tone::Muted => text.dimmed(),
    }
}

pub fn format_view(
    session: &Session,
    view: ViewId,
    filter: &CategoryFilter,
    search: &str,
    date_format: &str,
    now: DateTime<Utc>,
) -> String {
    let data = session.get_view(view, filter, search);
    let body = rows(&data, date_format, now);
    let cols = headers(view);

    let mut table = Table::new();
    if view == ViewId::Membership {
        // One record, so list it as label/value pairs.
        table.set_header(vec!["Field", "Value"]);
        for row in &body {
            for (label, field) in cols.iter().zip(row) {
                table.add_row(vec![Cell::new(label), Cell::new(paint(field))]);
            }
        }
    } else {
        table.set_header(cols.to_vec());
        for row in &body {
            table.add_row(row.iter().map(|f| Cell::new(paint(f))).collect::<Vec<_>>());
        }
    }

    let mut out = format!("{}\n", view.title().bold());
    if body.is_empty() {
        out.push_str(&format!("No {} match.\n", view.noun()));
    } else {
        out.push_str(&format!("{table}\n"));
    }
    out.push_str(&format!(
        "Showing {} of {} {}",
        data.matched_count(),
        data.total_count(),
        view.noun()
    ));

    let mut notes = Vec::new();
    if !filter.is_all() {
        notes.push(format!("filter: {filter}"));
    }
    if !search.is_empty() {
        notes.push(format!("search: \"{search}\""));
    }
    if !notes.is_empty() {
        out.push_str(&format!(" ({})", notes.join(", ")));
    }

    if !data.categories().is_empty() {
        out.push_str(&format!("\nCategories: {}", data.categories().join(", ")));
    }
    for (projection, total) in session.aggregates(view) {
        out.push_str(&format!(
            "\n{}: {}",
            projection.label(),
            fmt::aggregate(projection, total).bold()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn session() -> Session {
        let mut s = Session::new();
        s.submit_file(
            &json!([
                {"purchaseHistory": {"doc": {"title": "Chess", "documentType": "Android Apps"}, "invoicePrice": "$4.99"}},
                {"purchaseHistory": {"doc": {"title": "Novel", "documentType": "Books"}, "invoicePrice": "$5.00"}}
            ])
            .to_string(),
        )
        .unwrap();
        s
    }

    #[test]
    fn test_view_counts_and_totals() {
        colored::control::set_override(false);
        let out = format_view(
            &session(),
            ViewId::Purchases,
            &CategoryFilter::Exact("Books".into()),
            "",
            "%Y-%m-%d",
            now(),
        );
        assert!(out.contains("Novel"));
        assert!(!out.contains("Chess"));
        assert!(out.contains("Showing 1 of 2 purchases (filter: Books)"));
        assert!(out.contains("Categories: Android Apps, Books"));
        assert!(out.contains("Total spent: $9.99"));
    }

    #[test]
    fn test_view_no_matches() {
        colored::control::set_override(false);
        let out = format_view(
            &session(),
            ViewId::Purchases,
            &CategoryFilter::All,
            "zzz",
            "%Y-%m-%d",
            now(),
        );
        assert!(out.contains("No purchases match."));
        assert!(out.contains("Showing 0 of 2 purchases (search: \"zzz\")"));
    }

    #[test]
    fn test_blank_ledger_category_left_out_of_categories_line() {
        colored::control::set_override(false);
        let mut s = Session::new();
        s.submit_file(
            &json!([{"playPointsDetails": {"pointsHistory": [
                {"pointsChange": "5"},
                {"category": "Points earned", "pointsChange": "10"}
            ]}}])
            .to_string(),
        )
        .unwrap();
        let out = format_view(&s, ViewId::PointsLedger, &CategoryFilter::All, "", "%Y", now());
        assert!(out.contains("Categories: Points earned"));
        assert!(!out.contains("Categories: ,"));
    }

    #[test]
    fn test_membership_is_transposed() {
        colored::control::set_override(false);
        let mut s = Session::new();
        s.submit_file(
            &json!([{"playPointsDetails": {"membership": {"level": "Gold", "pointsBalance": "1200"}}}])
                .to_string(),
        )
        .unwrap();
        let out = format_view(&s, ViewId::Membership, &CategoryFilter::All, "", "%Y", now());
        assert!(out.contains("Field"));
        assert!(out.contains("1,200"));
        assert!(out.contains("Showing 1 of 1 memberships"));
    }
}
