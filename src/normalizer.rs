use serde_json::Value;
use tracing::debug;

use crate::classifier::{attempted_markers, items, Marker};
use crate::error::{LedgerError, Result};
use crate::models::{
    Level, MembershipRecord, OrderRecord, PointsLedgerEntry, PromotionRecord, PromotionState,
    PromotionStatus, PurchaseRecord, RecordType,
};
use crate::parse::{first, flag, int_or_zero, path, text, text_or_default, timestamp};

/// Document type used when the export omits one.
pub const DEFAULT_DOCUMENT_TYPE: &str = "Other";

/// Canonical output of one upload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Normalized {
    pub membership: Option<MembershipRecord>,
    pub ledger: Vec<PointsLedgerEntry>,
    pub purchases: Vec<PurchaseRecord>,
    pub promotions: Vec<PromotionRecord>,
    pub orders: Vec<OrderRecord>,
}

pub fn normalize(value: &Value, kind: RecordType) -> Result<Normalized> {
    let batch = match kind {
        RecordType::Membership | RecordType::PointsLedgerEntry => normalize_play_points(value),
        RecordType::PurchaseRecord => Normalized {
            purchases: hoist(value, Marker::Purchases, purchase_record),
            ..Default::default()
        },
        RecordType::PromotionRecord => Normalized {
            promotions: hoist(value, Marker::Promotions, promotion_record),
            ..Default::default()
        },
        RecordType::OrderRecord => Normalized {
            orders: hoist(value, Marker::Orders, order_record),
            ..Default::default()
        },
        RecordType::Unknown => {
            return Err(LedgerError::UnrecognizedSchema {
                attempted: attempted_markers(),
            })
        }
    };
    debug!(
        kind = %kind,
        membership = batch.membership.is_some(),
        ledger = batch.ledger.len(),
        purchases = batch.purchases.len(),
        promotions = batch.promotions.len(),
        orders = batch.orders.len(),
        "normalized upload"
    );
    Ok(batch)
}

/// Map every item that carries `marker` as a nested object to one record.
/// Items without it are skipped.
fn hoist<R>(value: &Value, marker: Marker, build: fn(&Value) -> R) -> Vec<R> {
    items(value)
        .iter()
        .filter_map(|item| marker.find(item).filter(|v| v.is_object()))
        .map(build)
        .collect()
}

// ---------------------------------------------------------------------------
// Play Points: membership + ledger from the same file
// ---------------------------------------------------------------------------

fn normalize_play_points(value: &Value) -> Normalized {
    let key = Marker::PlayPoints.key();
    let seq = items(value);

    let membership = seq
        .iter()
        .find_map(|item| path(item, &[key, "membership"]).filter(|m| m.is_object()))
        .map(membership_record);

    let mut ledger = Vec::new();
    for history in seq.iter().filter_map(|item| path(item, &[key, "pointsHistory"])) {
        match history {
            Value::Array(entries) => ledger.extend(entries.iter().filter(|e| e.is_object())),
            Value::Object(_) => ledger.push(history),
            _ => {}
        }
    }
    let ledger = ledger
        .into_iter()
        .enumerate()
        .map(|(position, raw)| ledger_entry(position, raw))
        .collect();

    Normalized {
        membership,
        ledger,
        ..Default::default()
    }
}

fn level(value: Option<&Value>) -> Level {
    Level::from_label(&text(value).unwrap_or_default())
}

fn membership_record(m: &Value) -> MembershipRecord {
    MembershipRecord {
        level: level(m.get("level")),
        status: text(m.get("status")).unwrap_or_default(),
        points_balance: int_or_zero(m.get("pointsBalance")),
        points_to_next_level: int_or_zero(m.get("pointsToNextLevel")),
        country: text(m.get("country")).unwrap_or_default(),
        enroll_time: timestamp(m.get("enrollTime")),
        level_completion_time: timestamp(m.get("levelCompletionTime")),
        level_expiration_time: timestamp(m.get("levelExpirationTime")),
        points_expiration_time: timestamp(m.get("pointsExpirationTime")),
    }
}

fn ledger_entry(position: usize, e: &Value) -> PointsLedgerEntry {
    let doc = first(e.get("doc"));
    PointsLedgerEntry {
        position,
        transaction_id: text(e.get("transactionId")),
        category: text(e.get("category")).unwrap_or_default(),
        points_change: int_or_zero(e.get("pointsChange")),
        pre_transaction_balance: int_or_zero(e.get("preTransactionBalance")),
        post_transaction_balance: int_or_zero(e.get("postTransactionBalance")),
        pre_transaction_level: level(e.get("preTransactionLevel")),
        post_transaction_level: level(e.get("postTransactionLevel")),
        time: timestamp(e.get("time")),
        order_id: text(e.get("orderId")),
        item_title: doc.and_then(|d| text(d.get("title"))),
        item_document_type: doc.and_then(|d| text(d.get("documentType"))),
    }
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

fn purchase_record(p: &Value) -> PurchaseRecord {
    PurchaseRecord {
        document_type: text_or_default(path(p, &["doc", "documentType"]), DEFAULT_DOCUMENT_TYPE),
        title: text(path(p, &["doc", "title"])),
        invoice_price: text(p.get("invoicePrice")).unwrap_or_default(),
        payment_method_title: text(p.get("paymentMethodTitle")),
        purchase_time: timestamp(p.get("purchaseTime")),
        user_country: text(p.get("userCountry")),
        user_language_code: text(p.get("userLanguageCode")),
    }
}

// ---------------------------------------------------------------------------
// Promotions
// ---------------------------------------------------------------------------

fn promotion_state(s: &Value) -> PromotionState {
    let device = s.get("device");
    PromotionState {
        status: PromotionStatus::from_label(&text(s.get("status")).unwrap_or_default()),
        timestamp: timestamp(s.get("timestamp")),
        device_label: device.and_then(|d| {
            text(d.get("deviceDisplayName")).or_else(|| text(d.get("model")))
        }),
    }
}

fn promotion_record(p: &Value) -> PromotionRecord {
    let context = p.get("instanceContext");
    let field = |key: &str| context.and_then(|c| path(c, &[key]));
    let status_history = path(p, &["promotionHistory", "promotionState"])
        .and_then(Value::as_array)
        .map(|states| {
            states
                .iter()
                .filter(|s| s.is_object())
                .map(promotion_state)
                .collect()
        })
        .unwrap_or_default();
    PromotionRecord {
        title: context.and_then(|c| text(path(c, &["document", "title"]))),
        country: text(field("country")),
        total_quantity: int_or_zero(field("totalQuantity")),
        expiry_time: timestamp(field("expiryTime")),
        status_history,
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

fn order_record(o: &Value) -> OrderRecord {
    let line_item = first(o.get("lineItem"));
    let doc = line_item.and_then(|li| path(li, &["doc"]));
    let contact = first(o.get("associatedContact")).or_else(|| path(o, &["billingContact"]));
    let contact_field = |key: &str| contact.and_then(|c| text(c.get(key)));
    let price = |key: &str| text(o.get(key));
    OrderRecord {
        order_id: text(o.get("orderId")),
        document_type: text_or_default(
            doc.and_then(|d| d.get("documentType")),
            DEFAULT_DOCUMENT_TYPE,
        ),
        title: doc.and_then(|d| text(d.get("title"))),
        quantity: int_or_zero(line_item.and_then(|li| li.get("quantity"))),
        payment_method: text(path(o, &["billingInstrument", "displayName"])),
        total_price: price("totalPrice").unwrap_or_default(),
        refund_amount: price("refundAmount"),
        discount: price("discount"),
        tax: price("tax"),
        creation_time: timestamp(o.get("creationTime")),
        preorder: flag(o.get("preorder")),
        contact_name: contact_field("name"),
        contact_city: contact_field("city"),
        contact_state: contact_field("state"),
        contact_postal_code: contact_field("postalCode"),
        ip_country: text(o.get("ipCountry")),
    }
}
