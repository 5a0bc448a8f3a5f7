//! Column layout for each view, shared by the text report, CSV export and
//! interactive browser. Cells carry a tone so each front end can color them
//! its own way.

use chrono::{DateTime, Utc};

use crate::fmt::{or_na, points, points_change, price, quantity};
use crate::models::{
    MembershipRecord, OrderRecord, PointsLedgerEntry, PromotionRecord, PromotionStatus,
    PurchaseRecord, Timestamp,
};
use crate::parse::format_timestamp;
use crate::session::ViewData;
use crate::views::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Positive,
    Negative,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub text: String,
    pub tone: Tone,
}

impl Field {
    fn plain(text: impl Into<String>) -> Self {
        Self::toned(text, Tone::Plain)
    }

    fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

pub fn headers(view: ViewId) -> &'static [&'static str] {
    match view {
        ViewId::Empty => &[],
        ViewId::Membership => &[
            "Level",
            "Status",
            "Points",
            "To next level",
            "Country",
            "Enrolled",
            "Level completed",
            "Level expires",
            "Points expire",
        ],
        ViewId::PointsLedger => &[
            "ID", "Date", "Category", "Item", "Type", "Change", "Before", "Balance", "Level",
            "Order",
        ],
        ViewId::Purchases => &[
            "Date", "Title", "Type", "Price", "Payment", "Country", "Language",
        ],
        ViewId::Promotions => &[
            "Title", "Status", "Country", "Qty", "Expires", "Started", "Device", "History",
        ],
        ViewId::Orders => &[
            "Date", "Order ID", "Title", "Qty", "Type", "Total", "Refund", "Payment", "Contact",
            "Country",
        ],
    }
}

/// Rows for the matched records of a view, in view order.
pub fn rows(data: &ViewData<'_>, date_format: &str, now: DateTime<Utc>) -> Vec<Vec<Field>> {
    let ts = |t: &Timestamp| format_timestamp(t, date_format);
    match data {
        ViewData::Empty => Vec::new(),
        ViewData::Membership(v) => v.records.iter().map(|m| membership_row(m, &ts)).collect(),
        ViewData::Ledger(v) => v.records.iter().map(|e| ledger_row(e, &ts)).collect(),
        ViewData::Purchases(v) => v.records.iter().map(|p| purchase_row(p, &ts)).collect(),
        ViewData::Promotions(v) => v
            .records
            .iter()
            .map(|p| promotion_row(p, &ts, now))
            .collect(),
        ViewData::Orders(v) => v.records.iter().map(|o| order_row(o, &ts)).collect(),
    }
}

type TsFmt<'f> = dyn Fn(&Timestamp) -> String + 'f;

fn membership_row(m: &MembershipRecord, ts: &TsFmt<'_>) -> Vec<Field> {
    vec![
        Field::toned(m.level.as_str(), Tone::Positive),
        Field::plain(m.status.as_str()),
        Field::plain(points(m.points_balance)),
        Field::plain(points(m.points_to_next_level)),
        Field::plain(m.country.as_str()),
        Field::plain(ts(&m.enroll_time)),
        Field::plain(ts(&m.level_completion_time)),
        Field::plain(ts(&m.level_expiration_time)),
        Field::plain(ts(&m.points_expiration_time)),
    ]
}

fn category_tone(category: &str) -> Tone {
    let lower = category.to_lowercase();
    if lower.contains("earned") || lower.contains("redeemed") || lower.contains("prize") {
        Tone::Positive
    } else if lower.contains("used") {
        Tone::Negative
    } else {
        Tone::Plain
    }
}

fn ledger_row(e: &PointsLedgerEntry, ts: &TsFmt<'_>) -> Vec<Field> {
    let change_tone = if e.is_deduction() {
        Tone::Negative
    } else {
        Tone::Positive
    };
    let level = if e.level_changed() {
        Field::toned(
            format!("{} \u{2192} {}", e.pre_transaction_level, e.post_transaction_level),
            Tone::Positive,
        )
    } else {
        Field::plain(e.post_transaction_level.as_str())
    };
    vec![
        Field::toned(e.key(), Tone::Muted),
        Field::plain(ts(&e.time)),
        Field::toned(e.category.as_str(), category_tone(&e.category)),
        Field::plain(or_na(e.item_title.as_deref())),
        Field::plain(e.item_document_type.as_deref().unwrap_or("")),
        Field::toned(points_change(e.points_change), change_tone),
        Field::toned(points(e.pre_transaction_balance), Tone::Muted),
        Field::plain(points(e.post_transaction_balance)),
        level,
        Field::toned(e.order_id.as_deref().unwrap_or(""), Tone::Muted),
    ]
}

fn purchase_row(p: &PurchaseRecord, ts: &TsFmt<'_>) -> Vec<Field> {
    let price_tone = if p.is_free() { Tone::Positive } else { Tone::Plain };
    vec![
        Field::plain(ts(&p.purchase_time)),
        Field::plain(or_na(p.title.as_deref())),
        Field::plain(p.document_type.as_str()),
        Field::toned(price(&p.invoice_price), price_tone),
        Field::plain(p.payment_method_title.as_deref().unwrap_or("")),
        Field::plain(or_na(p.user_country.as_deref())),
        Field::plain(or_na(p.user_language_code.as_deref())),
    ]
}

fn status_tone(status: &PromotionStatus) -> Tone {
    match status {
        PromotionStatus::Active => Tone::Positive,
        PromotionStatus::Expired => Tone::Negative,
        PromotionStatus::Provisioned | PromotionStatus::Other(_) => Tone::Plain,
    }
}

fn promotion_row(p: &PromotionRecord, ts: &TsFmt<'_>, now: DateTime<Utc>) -> Vec<Field> {
    let status = match p.latest_status() {
        Some(state) => Field::toned(state.status.as_str(), status_tone(&state.status)),
        None => Field::plain(""),
    };
    let expires = if p.expiry_time.is_none() {
        Field::plain("")
    } else if p.is_expired_at(now) {
        Field::toned(format!("{} (expired)", ts(&p.expiry_time)), Tone::Negative)
    } else {
        Field::plain(ts(&p.expiry_time))
    };
    let first = p.first_state();
    let history = if p.status_history.len() > 1 {
        p.status_history
            .iter()
            .map(|s| s.status.as_str())
            .collect::<Vec<_>>()
            .join(" \u{2192} ")
    } else {
        String::new()
    };
    vec![
        Field::plain(p.title.as_deref().unwrap_or("Untitled Promotion")),
        status,
        Field::plain(p.country.as_deref().unwrap_or("")),
        match p.total_quantity {
            0 => Field::plain(""),
            n if p.is_unlimited() => Field::toned(quantity(n), Tone::Positive),
            n => Field::plain(quantity(n)),
        },
        expires,
        Field::plain(first.map(|s| ts(&s.timestamp)).unwrap_or_default()),
        Field::plain(first.and_then(|s| s.device_label.clone()).unwrap_or_default()),
        Field::toned(history, Tone::Muted),
    ]
}

fn order_contact(o: &OrderRecord) -> String {
    let Some(name) = o.contact_name.as_deref() else {
        return String::new();
    };
    match (o.contact_city.as_deref(), o.contact_state.as_deref()) {
        (Some(city), Some(state)) => {
            let postal = o.contact_postal_code.as_deref().unwrap_or("");
            format!("{name}, {city}, {state} {postal}").trim_end().to_string()
        }
        _ => name.to_string(),
    }
}

fn order_row(o: &OrderRecord, ts: &TsFmt<'_>) -> Vec<Field> {
    let refund = if o.is_refunded() {
        Field::toned(o.refund_amount.clone().unwrap_or_default(), Tone::Negative)
    } else {
        Field::plain("")
    };
    let total_tone = if o.total_amount() == 0.0 { Tone::Positive } else { Tone::Plain };
    let title = o.title.as_deref().unwrap_or("Unknown Item");
    let title = if o.preorder {
        format!("{title} (preorder)")
    } else {
        title.to_string()
    };
    vec![
        Field::plain(ts(&o.creation_time)),
        Field::toned(o.order_id.as_deref().unwrap_or(""), Tone::Muted),
        Field::plain(title),
        Field::plain(if o.quantity > 0 { quantity(o.quantity) } else { String::new() }),
        Field::plain(o.document_type.as_str()),
        Field::toned(price(&o.total_price), total_tone),
        refund,
        Field::plain(o.payment_method.as_deref().unwrap_or("")),
        Field::plain(order_contact(o)),
        Field::plain(o.ip_country.as_deref().unwrap_or("")),
    ]
}
