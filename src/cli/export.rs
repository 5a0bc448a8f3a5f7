use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::load::load_files;
use crate::error::Result;
use crate::query::CategoryFilter;
use crate::session::Session;
use crate::settings::load_settings;
use crate::table::{headers, rows};
use crate::views::ViewId;

pub fn run(
    files: &[PathBuf],
    view: ViewId,
    filter: &CategoryFilter,
    search: &str,
    output: &Path,
) -> Result<()> {
    let session = load_files(files);
    session.require_data()?;
    let settings = load_settings();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(output)?;
    let written = write_csv(file, &session, view, filter, search, &settings.date_format)?;
    println!("Wrote {written} {} to {}", view.noun(), output.display());
    Ok(())
}

/// Write the matched records of `view` as CSV. Returns the number of rows.
pub fn write_csv<W: Write>(
    out: W,
    session: &Session,
    view: ViewId,
    filter: &CategoryFilter,
    search: &str,
    date_format: &str,
) -> Result<usize> {
    let data = session.get_view(view, filter, search);
    let body = rows(&data, date_format, Utc::now());

    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(headers(view))?;
    for row in &body {
        wtr.write_record(row.iter().map(|f| f.text.as_str()))?;
    }
    wtr.flush()?;
    Ok(body.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_csv_filtered() {
        let mut s = Session::new();
        s.submit_file(
            &json!([
                {"orderHistory": {"orderId": "GPA.1", "totalPrice": "$1,000.00", "lineItem": [{"doc": {"title": "Tablet", "documentType": "Devices"}}]}},
                {"orderHistory": {"orderId": "GPA.2", "totalPrice": "$2.00", "lineItem": [{"doc": {"title": "Song", "documentType": "Music"}}]}}
            ])
            .to_string(),
        )
        .unwrap();

        let mut buf = Vec::new();
        let n = write_csv(
            &mut buf,
            &s,
            ViewId::Orders,
            &CategoryFilter::Exact("Devices".into()),
            "",
            "%Y-%m-%d",
        )
        .unwrap();
        assert_eq!(n, 1);
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Order ID,Title,Qty,Type,Total,Refund,Payment,Contact,Country")
        );
        assert_eq!(lines.next(), Some("N/A,GPA.1,Tablet,,Devices,\"$1,000.00\",,,,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_csv_empty_view_has_header_only() {
        let s = Session::new();
        let mut buf = Vec::new();
        let n = write_csv(&mut buf, &s, ViewId::Purchases, &CategoryFilter::All, "", "%Y").unwrap();
        assert_eq!(n, 0);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Date,Title,Type,Price,Payment,Country,Language\n"
        );
    }
}
