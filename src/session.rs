use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::classifier::classify;
use crate::error::{LedgerError, Result};
use crate::models::{
    MembershipRecord, OrderRecord, PointsLedgerEntry, PromotionRecord, PurchaseRecord, RecordType,
};
use crate::normalizer::{normalize, Normalized};
use crate::query::{
    aggregate_sum, category_vocabulary, filter, ledger_projection, order_projection,
    purchase_projection, CategoryFilter, Projection, Record,
};
use crate::views::{available_views, select_initial_view, Presence, ViewId};

/// A file that could not be loaded, kept for display until the next reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub label: String,
    pub reason: String,
}

/// Normalized record lists for everything loaded so far.
///
/// Each detected type owns one slot; loading another file of the same type
/// replaces that slot and leaves the others alone.
#[derive(Debug, Default)]
pub struct Session {
    membership: Option<MembershipRecord>,
    ledger: Vec<PointsLedgerEntry>,
    purchases: Vec<PurchaseRecord>,
    promotions: Vec<PromotionRecord>,
    orders: Vec<OrderRecord>,
    rejections: Vec<Rejection>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, classify, normalize and merge one file's text.
    pub fn submit_file(&mut self, text: &str) -> Result<RecordType> {
        let value: Value = serde_json::from_str(text)?;
        let kind = classify(&value)?;
        let batch = normalize(&value, kind)?;
        self.merge(kind, batch);
        Ok(kind)
    }

    /// Like `submit_file`, but remembers the failure under `label`.
    pub fn submit_named(&mut self, label: &str, text: &str) -> Result<RecordType> {
        let result = self.submit_file(text);
        match &result {
            Ok(kind) => debug!(
                file = label,
                kind = %kind,
                view = %ViewId::for_record_type(*kind),
                "file accepted"
            ),
            Err(e) => self.reject(label, e),
        }
        result
    }

    pub fn submit_path(&mut self, path: &Path) -> Result<RecordType> {
        let label = path.display().to_string();
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = LedgerError::Io(e);
                self.reject(&label, &err);
                return Err(err);
            }
        };
        match String::from_utf8(bytes) {
            Ok(text) => self.submit_named(&label, &text),
            Err(e) => {
                let err = LedgerError::MalformedJson(format!("file is not UTF-8 text: {e}"));
                self.reject(&label, &err);
                Err(err)
            }
        }
    }

    fn reject(&mut self, label: &str, err: &LedgerError) {
        warn!(file = label, "rejected: {err}");
        self.rejections.push(Rejection {
            label: label.to_string(),
            reason: err.to_string(),
        });
    }

    fn merge(&mut self, kind: RecordType, batch: Normalized) {
        match kind {
            RecordType::Membership | RecordType::PointsLedgerEntry => {
                self.membership = batch.membership;
                self.ledger = batch.ledger;
            }
            RecordType::PurchaseRecord => self.purchases = batch.purchases,
            RecordType::PromotionRecord => self.promotions = batch.promotions,
            RecordType::OrderRecord => self.orders = batch.orders,
            RecordType::Unknown => {}
        }
    }

    /// Clear every list and any remembered rejections.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    pub fn membership(&self) -> Option<&MembershipRecord> {
        self.membership.as_ref()
    }

    pub fn ledger(&self) -> &[PointsLedgerEntry] {
        &self.ledger
    }

    pub fn purchases(&self) -> &[PurchaseRecord] {
        &self.purchases
    }

    pub fn promotions(&self) -> &[PromotionRecord] {
        &self.promotions
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn presence(&self) -> Presence {
        Presence {
            membership: self.membership.is_some(),
            ledger_count: self.ledger.len(),
            purchase_count: self.purchases.len(),
            promotion_count: self.promotions.len(),
            order_count: self.orders.len(),
        }
    }

    pub fn initial_view(&self) -> ViewId {
        select_initial_view(&self.presence())
    }

    pub fn available_views(&self) -> Vec<ViewId> {
        available_views(&self.presence())
    }

    /// Gate for opening a dashboard.
    pub fn require_data(&self) -> Result<()> {
        if self.presence().is_empty() {
            Err(LedgerError::NoDataSubmitted)
        } else {
            Ok(())
        }
    }

    pub fn get_view(&self, view: ViewId, category: &CategoryFilter, search: &str) -> ViewData<'_> {
        match view {
            ViewId::Empty => ViewData::Empty,
            ViewId::Membership => {
                let records = self.membership.as_slice();
                ViewData::Membership(View::build(records, category, search))
            }
            ViewId::PointsLedger => ViewData::Ledger(View::build(&self.ledger, category, search)),
            ViewId::Purchases => {
                ViewData::Purchases(View::build(&self.purchases, category, search))
            }
            ViewId::Promotions => {
                ViewData::Promotions(View::build(&self.promotions, category, search))
            }
            ViewId::Orders => ViewData::Orders(View::build(&self.orders, category, search)),
        }
    }

    /// Sum `projection` over the whole list behind `view`, ignoring any filter.
    pub fn get_aggregate(&self, view: ViewId, projection: Projection) -> Result<f64> {
        projection.check_view(view)?;
        let total = match view {
            ViewId::PointsLedger => {
                aggregate_sum(&self.ledger, |e| ledger_projection(projection, e))
            }
            ViewId::Purchases => {
                aggregate_sum(&self.purchases, |p| purchase_projection(projection, p))
            }
            ViewId::Orders => aggregate_sum(&self.orders, |o| order_projection(projection, o)),
            ViewId::Empty | ViewId::Membership | ViewId::Promotions => 0.0,
        };
        Ok(total)
    }

    /// Every aggregate that applies to `view`, labelled.
    pub fn aggregates(&self, view: ViewId) -> Vec<(Projection, f64)> {
        Projection::for_view(view)
            .into_iter()
            .filter_map(|p| self.get_aggregate(view, p).ok().map(|total| (p, total)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// View results
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct View<'a, R> {
    pub records: Vec<&'a R>,
    pub total_count: usize,
    pub matched_count: usize,
    pub categories: Vec<String>,
}

impl<'a, R: Record> View<'a, R> {
    pub fn build(all: &'a [R], category: &CategoryFilter, search: &str) -> Self {
        let records = filter(all, category, search);
        Self {
            matched_count: records.len(),
            total_count: all.len(),
            categories: category_vocabulary(all),
            records,
        }
    }
}

#[derive(Debug)]
pub enum ViewData<'a> {
    Empty,
    Membership(View<'a, MembershipRecord>),
    Ledger(View<'a, PointsLedgerEntry>),
    Purchases(View<'a, PurchaseRecord>),
    Promotions(View<'a, PromotionRecord>),
    Orders(View<'a, OrderRecord>),
}

impl ViewData<'_> {
    pub fn total_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Membership(v) => v.total_count,
            Self::Ledger(v) => v.total_count,
            Self::Purchases(v) => v.total_count,
            Self::Promotions(v) => v.total_count,
            Self::Orders(v) => v.total_count,
        }
    }

    pub fn matched_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Membership(v) => v.matched_count,
            Self::Ledger(v) => v.matched_count,
            Self::Purchases(v) => v.matched_count,
            Self::Promotions(v) => v.matched_count,
            Self::Orders(v) => v.matched_count,
        }
    }

    pub fn categories(&self) -> &[String] {
        match self {
            Self::Empty => &[],
            Self::Membership(v) => &v.categories,
            Self::Ledger(v) => &v.categories,
            Self::Purchases(v) => &v.categories,
            Self::Promotions(v) => &v.categories,
            Self::Orders(v) => &v.categories,
        }
    }
}
