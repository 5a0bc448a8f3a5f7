//! Lenient field access and typed parsing shared by every record type.
//!
//! Source exports are not contractually validated, so nothing here fails:
//! numbers that do not parse become 0 and timestamps become `None`, which
//! renders as `"N/A"`.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::Timestamp;

pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Value navigation
// ---------------------------------------------------------------------------

/// Walk nested object keys. `null` at the end of the path counts as absent.
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in keys {
        current = current.get(key)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Whether a field counts as present: `null`, `false`, `0` and `""` do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First element of an array value.
pub fn first(value: Option<&Value>) -> Option<&Value> {
    value?.as_array()?.first().filter(|v| !v.is_null())
}

/// Text of a scalar field. Empty strings are treated as absent.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn text_or_default(value: Option<&Value>, default: &str) -> String {
    text(value).unwrap_or_else(|| default.to_string())
}

pub fn flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Parse an integer, accepting a sign and thousands separators. Fractions are
/// truncated toward zero. Anything unparsable is 0.
pub fn parse_int(raw: &str) -> i64 {
    let s: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if let Ok(n) = s.parse::<i64>() {
        return n;
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f.trunc() as i64)
        .unwrap_or(0)
}

pub fn int_or_zero(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_int(s),
        _ => 0,
    }
}

/// Parse a currency string such as `$1,234.56`, `-$50.00` or `(12.00)`.
/// The currency symbol is ignored. Anything unparsable is 0.
pub fn parse_amount(raw: &str) -> f64 {
    let s: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '(' | ')'))
        .collect();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.parse::<f64>().unwrap_or(0.0);
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Round a currency total to whole cents.
pub fn round_cents(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Strings are parsed as dates; numbers are epoch milliseconds.
pub fn timestamp(value: Option<&Value>) -> Timestamp {
    match value? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

/// Render with a chrono format string. A format chrono cannot render gives
/// "N/A" rather than a panic.
pub fn format_timestamp(ts: &Timestamp, fmt: &str) -> String {
    let Some(dt) = ts else {
        return NOT_AVAILABLE.to_string();
    };
    let mut out = String::new();
    match write!(out, "{}", dt.format(fmt)) {
        Ok(()) => out,
        Err(_) => NOT_AVAILABLE.to_string(),
    }
}
