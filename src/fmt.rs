use crate::models::UNLIMITED_QUANTITY;
use crate::query::Projection;

fn group_thousands(digits: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let with_commas = group_thousands(int_part);

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Whole points with thousands separators: 12,500
pub fn points(val: i64) -> String {
    let grouped = group_thousands(&val.unsigned_abs().to_string());
    if val < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Signed points change as shown in the ledger: +250 / -1,000
pub fn points_change(val: i64) -> String {
    if val >= 0 {
        format!("+{}", points(val))
    } else {
        points(val)
    }
}

/// Invoice price as displayed: zero prices read "Free".
pub fn price(raw: &str) -> String {
    if raw.is_empty() {
        return crate::parse::NOT_AVAILABLE.to_string();
    }
    if crate::parse::parse_amount(raw) == 0.0 {
        "Free".to_string()
    } else {
        raw.to_string()
    }
}

pub fn quantity(val: i64) -> String {
    if val == UNLIMITED_QUANTITY {
        "Unlimited".to_string()
    } else {
        points(val)
    }
}

pub fn or_na(val: Option<&str>) -> &str {
    val.unwrap_or(crate::parse::NOT_AVAILABLE)
}

/// An aggregate in the unit of its projection.
pub fn aggregate(projection: Projection, total: f64) -> String {
    if projection.is_currency() {
        money(total)
    } else {
        points(total.round() as i64)
    }
}
