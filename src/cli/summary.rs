use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use super::load::load_files;
use crate::error::Result;
use crate::session::Session;
use crate::views::{ViewId, VIEW_PRIORITY};

pub fn run(files: &[PathBuf]) -> Result<()> {
    let session = load_files(files);
    println!("{}", format_summary(&session));
    Ok(())
}

fn view_count(session: &Session, view: ViewId) -> usize {
    let presence = session.presence();
    match view {
        ViewId::Empty => 0,
        ViewId::Membership => usize::from(presence.membership),
        ViewId::PointsLedger => presence.ledger_count,
        ViewId::Purchases => presence.purchase_count,
        ViewId::Promotions => presence.promotion_count,
        ViewId::Orders => presence.order_count,
    }
}

pub fn format_summary(session: &Session) -> String {
    let mut table = Table::new();
    table.set_header(vec!["View", "Records"]);
    for view in VIEW_PRIORITY {
        let count = view_count(session, *view);
        let cell = if count == 0 {
            Cell::new("-".dimmed())
        } else {
            Cell::new(count)
        };
        table.add_row(vec![Cell::new(view.title()), cell]);
    }

    let mut out = format!("{}\n{table}\n", "Loaded data".bold());
    let initial = session.initial_view();
    if initial == ViewId::Empty {
        out.push_str("\nNo data loaded. Provide at least one recognized JSON export.");
    } else {
        let tabs: Vec<&str> = session.available_views().iter().map(|v| v.title()).collect();
        out.push_str(&format!("\nInitial view: {}", initial.title()));
        out.push_str(&format!("\nAvailable views: {}", tabs.join(", ")));
    }
    for rejected in session.rejections() {
        out.push_str(&format!(
            "\n{} {}: {}",
            "Rejected".red(),
            rejected.label,
            rejected.reason
        ));
    }
    out
}
