use std::fmt;

use chrono::{DateTime, Utc};

/// `None` covers both a missing and an unparsable source value.
pub type Timestamp = Option<DateTime<Utc>>;

/// Quantity value the export uses for "no limit".
pub const UNLIMITED_QUANTITY: i64 = 2_147_483_647;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Membership,
    PointsLedgerEntry,
    PurchaseRecord,
    PromotionRecord,
    OrderRecord,
    Unknown,
}

impl RecordType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Membership => "Play Points membership",
            Self::PointsLedgerEntry => "Play Points history",
            Self::PurchaseRecord => "Purchase history",
            Self::PromotionRecord => "Promotion history",
            Self::OrderRecord => "Order history",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Closed vocabularies with an escape hatch for labels we do not know
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
    Gold,
    Silver,
    Bronze,
    Other(String),
}

impl Level {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Gold" => Self::Gold,
            "Silver" => Self::Silver,
            "Bronze" => Self::Bronze,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionStatus {
    Active,
    Provisioned,
    Expired,
    Other(String),
}

impl PromotionStatus {
    pub fn from_label(label: &str) -> Self {
        match label {
            "ACTIVE" => Self::Active,
            "PROVISIONED" => Self::Provisioned,
            "EXPIRED" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Provisioned => "PROVISIONED",
            Self::Expired => "EXPIRED",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MembershipRecord {
    pub level: Level,
    pub status: String,
    pub points_balance: i64,
    pub points_to_next_level: i64,
    pub country: String,
    pub enroll_time: Timestamp,
    pub level_completion_time: Timestamp,
    pub level_expiration_time: Timestamp,
    pub points_expiration_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsLedgerEntry {
    /// Index within the concatenated ledger of one upload.
    pub position: usize,
    pub transaction_id: Option<String>,
    pub category: String,
    pub points_change: i64,
    pub pre_transaction_balance: i64,
    pub post_transaction_balance: i64,
    pub pre_transaction_level: Level,
    pub post_transaction_level: Level,
    pub time: Timestamp,
    pub order_id: Option<String>,
    pub item_title: Option<String>,
    pub item_document_type: Option<String>,
}

impl PointsLedgerEntry {
    /// Transaction id, or the ledger position when the export omits it.
    pub fn key(&self) -> String {
        self.transaction_id
            .clone()
            .unwrap_or_else(|| format!("#{}", self.position + 1))
    }

    pub fn is_deduction(&self) -> bool {
        self.points_change < 0
    }

    pub fn level_changed(&self) -> bool {
        self.pre_transaction_level != self.post_transaction_level
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub document_type: String,
    pub title: Option<String>,
    pub invoice_price: String,
    pub payment_method_title: Option<String>,
    pub purchase_time: Timestamp,
    pub user_country: Option<String>,
    pub user_language_code: Option<String>,
}

impl PurchaseRecord {
    pub fn invoice_amount(&self) -> f64 {
        crate::parse::parse_amount(&self.invoice_price)
    }

    pub fn is_free(&self) -> bool {
        self.invoice_amount() == 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromotionState {
    pub status: PromotionStatus,
    pub timestamp: Timestamp,
    pub device_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRecord {
    pub title: Option<String>,
    pub country: Option<String>,
    pub total_quantity: i64,
    pub expiry_time: Timestamp,
    /// Source order, never re-sorted.
    pub status_history: Vec<PromotionState>,
}

impl PromotionRecord {
    pub fn latest_status(&self) -> Option<&PromotionState> {
        self.status_history.last()
    }

    pub fn first_state(&self) -> Option<&PromotionState> {
        self.status_history.first()
    }

    pub fn is_unlimited(&self) -> bool {
        self.total_quantity == UNLIMITED_QUANTITY
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_time.is_some_and(|t| t < now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub document_type: String,
    pub title: Option<String>,
    pub quantity: i64,
    pub payment_method: Option<String>,
    pub total_price: String,
    pub refund_amount: Option<String>,
    pub discount: Option<String>,
    pub tax: Option<String>,
    pub creation_time: Timestamp,
    pub preorder: bool,
    pub contact_name: Option<String>,
    pub contact_city: Option<String>,
    pub contact_state: Option<String>,
    pub contact_postal_code: Option<String>,
    pub ip_country: Option<String>,
}

impl OrderRecord {
    pub fn total_amount(&self) -> f64 {
        crate::parse::parse_amount(&self.total_price)
    }

    pub fn refund_amount_value(&self) -> f64 {
        self.refund_amount
            .as_deref()
            .map(crate::parse::parse_amount)
            .unwrap_or(0.0)
    }

    pub fn is_refunded(&self) -> bool {
        self.refund_amount_value() > 0.0
    }
}
