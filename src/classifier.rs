use serde_json::Value;
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::models::RecordType;
use crate::parse::{is_truthy, path};

// ---------------------------------------------------------------------------
// Markers, in precedence order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Marker {
    PlayPoints,
    Purchases,
    Promotions,
    Orders,
}

impl Marker {
    pub fn key(&self) -> &'static str {
        match self {
            Self::PlayPoints => "playPointsDetails",
            Self::Purchases => "purchaseHistory",
            Self::Promotions => "promotionHistory",
            Self::Orders => "orderHistory",
        }
    }

    /// The marker's value on `item`, if it is present and truthy.
    pub fn find<'a>(&self, item: &'a Value) -> Option<&'a Value> {
        path(item, &[self.key()]).filter(|v| is_truthy(v))
    }

    /// Record type for an item carrying this marker.
    fn record_type(&self, item: &Value) -> RecordType {
        match self {
            Self::PlayPoints => {
                if path(item, &[self.key(), "membership"]).is_some_and(is_truthy) {
                    RecordType::Membership
                } else {
                    RecordType::PointsLedgerEntry
                }
            }
            Self::Purchases => RecordType::PurchaseRecord,
            Self::Promotions => RecordType::PromotionRecord,
            Self::Orders => RecordType::OrderRecord,
        }
    }
}

pub const ALL_MARKERS: &[Marker] = &[
    Marker::PlayPoints,
    Marker::Purchases,
    Marker::Promotions,
    Marker::Orders,
];

pub fn attempted_markers() -> Vec<&'static str> {
    ALL_MARKERS.iter().map(|m| m.key()).collect()
}

/// View any JSON value as a sequence of items: arrays as-is, a bare object as
/// a one-element sequence, scalars as empty.
pub fn items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        Value::Object(_) => std::slice::from_ref(value),
        _ => &[],
    }
}

fn item_type(item: &Value) -> Option<RecordType> {
    if !item.is_object() {
        return None;
    }
    ALL_MARKERS
        .iter()
        .find(|m| m.find(item).is_some())
        .map(|m| m.record_type(item))
}

/// Type of the first item that carries any marker, or `Unknown`.
pub fn detect(value: &Value) -> RecordType {
    items(value)
        .iter()
        .enumerate()
        .find_map(|(idx, item)| item_type(item).map(|kind| (idx, kind)))
        .map(|(idx, kind)| {
            debug!(item = idx, kind = %kind, "marker found");
            kind
        })
        .unwrap_or(RecordType::Unknown)
}

pub fn classify(value: &Value) -> Result<RecordType> {
    match detect(value) {
        RecordType::Unknown => Err(LedgerError::UnrecognizedSchema {
            attempted: attempted_markers(),
        }),
        kind => Ok(kind),
    }
}
