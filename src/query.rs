use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::LedgerError;
use crate::models::{
    MembershipRecord, OrderRecord, PointsLedgerEntry, PromotionRecord, PurchaseRecord,
};
use crate::parse::round_cents;
use crate::views::ViewId;

/// Sentinel accepted on the command line for "no category restriction".
pub const ALL_CATEGORIES: &str = "all";

// ---------------------------------------------------------------------------
// Record trait: what each canonical record exposes to filtering
// ---------------------------------------------------------------------------

pub trait Record {
    /// Categorical values this record can be filtered by.
    fn categories(&self) -> Vec<&str>;
    /// Free-text fields searched by `filter`.
    fn search_fields(&self) -> Vec<&str>;
}

impl Record for MembershipRecord {
    fn categories(&self) -> Vec<&str> {
        vec![self.level.as_str()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.level.as_str(), self.status.as_str(), self.country.as_str()]
    }
}

impl Record for PointsLedgerEntry {
    fn categories(&self) -> Vec<&str> {
        vec![self.category.as_str()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.category.as_str(),
            self.item_title.as_deref().unwrap_or(""),
            self.transaction_id.as_deref().unwrap_or(""),
        ]
    }
}

impl Record for PurchaseRecord {
    fn categories(&self) -> Vec<&str> {
        vec![self.document_type.as_str()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_deref().unwrap_or(""),
            self.payment_method_title.as_deref().unwrap_or(""),
            self.invoice_price.as_str(),
        ]
    }
}

impl Record for PromotionRecord {
    fn categories(&self) -> Vec<&str> {
        self.status_history.iter().map(|s| s.status.as_str()).collect()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_deref().unwrap_or(""),
            self.country.as_deref().unwrap_or(""),
        ]
    }
}

impl Record for OrderRecord {
    fn categories(&self) -> Vec<&str> {
        vec![self.document_type.as_str()]
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.order_id.as_deref().unwrap_or(""),
            self.title.as_deref().unwrap_or(""),
            self.payment_method.as_deref().unwrap_or(""),
            self.total_price.as_str(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Exact(String),
}

impl CategoryFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        match self {
            Self::All => true,
            Self::Exact(want) => record.categories().iter().any(|c| *c == want.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Ok(Self::All)
        } else {
            Ok(Self::Exact(s.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CATEGORIES),
            Self::Exact(c) => f.write_str(c),
        }
    }
}

pub fn matches_search<R: Record>(record: &R, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Records passing both the category test and the search test, in input order.
pub fn filter<'a, R: Record>(
    records: &'a [R],
    category: &CategoryFilter,
    search: &str,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| category.matches(*r) && matches_search(*r, search))
        .collect()
}

/// Distinct category values across the unfiltered list, first-seen order.
/// Blank values are left out since there is nothing to select them by.
pub fn category_vocabulary<R: Record>(records: &[R]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        for category in record.categories() {
            if !category.is_empty() && !seen.iter().any(|s| s == category) {
                seen.push(category.to_string());
            }
        }
    }
    seen
}

/// Sum a numeric projection over every record given, rounded to cents.
pub fn aggregate_sum<R>(records: &[R], selector: impl Fn(&R) -> f64) -> f64 {
    round_cents(records.iter().map(selector).sum())
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Projection {
    /// Sum of purchase invoice prices
    InvoicePrice,
    /// Sum of order totals
    OrderTotal,
    /// Sum of order refunds
    RefundAmount,
    /// Sum of order discounts
    Discount,
    /// Sum of order taxes
    Tax,
    /// Net points change across the ledger
    PointsChange,
    /// Points added to the balance
    PointsEarned,
    /// Points deducted from the balance
    PointsSpent,
}

impl Projection {
    pub fn view(&self) -> ViewId {
        match self {
            Self::InvoicePrice => ViewId::Purchases,
            Self::OrderTotal | Self::RefundAmount | Self::Discount | Self::Tax => ViewId::Orders,
            Self::PointsChange | Self::PointsEarned | Self::PointsSpent => ViewId::PointsLedger,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InvoicePrice => "Total spent",
            Self::OrderTotal => "Order total",
            Self::RefundAmount => "Total refunded",
            Self::Discount => "Total discounts",
            Self::Tax => "Total tax",
            Self::PointsChange => "Net points",
            Self::PointsEarned => "Points earned",
            Self::PointsSpent => "Points spent",
        }
    }

    pub fn is_currency(&self) -> bool {
        self.view() != ViewId::PointsLedger
    }

    /// Projections that belong to `view`, in display order.
    pub fn for_view(view: ViewId) -> Vec<Projection> {
        Projection::value_variants()
            .iter()
            .copied()
            .filter(|p| p.view() == view)
            .collect()
    }

    pub fn check_view(&self, view: ViewId) -> Result<(), LedgerError> {
        if self.view() == view {
            Ok(())
        } else {
            Err(LedgerError::ProjectionMismatch {
                projection: *self,
                view,
            })
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn purchase_projection(projection: Projection, p: &PurchaseRecord) -> f64 {
    match projection {
        Projection::InvoicePrice => p.invoice_amount(),
        _ => 0.0,
    }
}

pub fn order_projection(projection: Projection, o: &OrderRecord) -> f64 {
    let amount = |raw: &Option<String>| raw.as_deref().map(crate::parse::parse_amount).unwrap_or(0.0);
    match projection {
        Projection::OrderTotal => o.total_amount(),
        Projection::RefundAmount => o.refund_amount_value(),
        Projection::Discount => amount(&o.discount),
        Projection::Tax => amount(&o.tax),
        _ => 0.0,
    }
}

pub fn ledger_projection(projection: Projection, e: &PointsLedgerEntry) -> f64 {
    match projection {
        Projection::PointsChange => e.points_change as f64,
        Projection::PointsEarned => e.points_change.max(0) as f64,
        Projection::PointsSpent => e.points_change.min(0).unsigned_abs() as f64,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, PromotionState, PromotionStatus};

    fn purchase(doc_type: &str, title: &str, price: &str, method: Option<&str>) -> PurchaseRecord {
        PurchaseRecord {
            document_type: doc_type.to_string(),
            title: Some(title.to_string()),
            invoice_price: price.to_string(),
            payment_method_title: method.map(String::from),
            purchase_time: None,
            user_country: None,
            user_language_code: None,
        }
    }

    fn ledger(category: &str, change: i64) -> PointsLedgerEntry {
        PointsLedgerEntry {
            position: 0,
            transaction_id: None,
            category: category.to_string(),
            points_change: change,
            pre_transaction_balance: 0,
            post_transaction_balance: 0,
            pre_transaction_level: Level::Gold,
            post_transaction_level: Level::Gold,
            time: None,
            order_id: None,
            item_title: None,
            item_document_type: None,
        }
    }

    fn promotion(title: &str, statuses: &[&str]) -> PromotionRecord {
        PromotionRecord {
            title: Some(title.to_string()),
            country: Some("US".to_string()),
            total_quantity: 1,
            expiry_time: None,
            status_history: statuses
                .iter()
                .map(|s| PromotionState {
                    status: PromotionStatus::from_label(s),
                    timestamp: None,
                    device_label: None,
                })
                .collect(),
        }
    }

    fn sample_purchases() -> Vec<PurchaseRecord> {
        vec![
            purchase("Android Apps", "Maps Pro", "$4.99", Some("Visa-1234")),
            purchase("Subscription", "Music", "$0.00", Some("PayPal")),
            purchase("Android Apps", "Puzzle", "$4.99", None),
        ]
    }

    #[test]
    fn test_all_and_empty_search_returns_everything_in_order() {
        let records = sample_purchases();
        let out = filter(&records, &CategoryFilter::All, "");
        assert_eq!(out.len(), 3);
        for (a, b) in out.iter().zip(records.iter()) {
            assert_eq!(*a, b);
        }
    }

    #[test]
    fn test_category_and_search_are_anded() {
        let records = sample_purchases();
        let apps = CategoryFilter::Exact("Android Apps".into());
        assert_eq!(filter(&records, &apps, "").len(), 2);
        let out = filter(&records, &apps, "PUZ");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("Puzzle"));
        assert!(filter(&records, &apps, "paypal").is_empty());
    }

    #[test]
    fn test_search_covers_price_literal_and_payment_method() {
        let records = sample_purchases();
        assert_eq!(filter(&records, &CategoryFilter::All, "$4.99").len(), 2);
        assert_eq!(filter(&records, &CategoryFilter::All, "visa").len(), 1);
    }

    #[test]
    fn test_category_filter_parses_all_sentinel() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Book".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Exact("Book".into())
        );
    }

    #[test]
    fn test_vocabulary_first_seen_without_duplicates() {
        let records = sample_purchases();
        assert_eq!(category_vocabulary(&records), vec!["Android Apps", "Subscription"]);

        let entries = vec![ledger("Points used", -5), ledger("Points earned", 5), ledger("Points used", -1)];
        assert_eq!(category_vocabulary(&entries), vec!["Points used", "Points earned"]);
    }

    #[test]
    fn test_vocabulary_skips_blank_categories() {
        let entries = vec![ledger("", 5), ledger("Points earned", 5), ledger("", -1)];
        assert_eq!(category_vocabulary(&entries), vec!["Points earned"]);
        assert!(category_vocabulary(&[ledger("", 1)]).is_empty());
    }

    #[test]
    fn test_vocabulary_values_all_appear_on_records() {
        let promos = vec![
            promotion("A", &["PROVISIONED", "ACTIVE"]),
            promotion("B", &["ACTIVE", "EXPIRED"]),
        ];
        let vocab = category_vocabulary(&promos);
        assert_eq!(vocab, vec!["PROVISIONED", "ACTIVE", "EXPIRED"]);
        for v in &vocab {
            assert!(promos.iter().any(|p| p.categories().contains(&v.as_str())));
        }
    }

    #[test]
    fn test_promotion_filter_matches_any_status_in_history() {
        let promos = vec![
            promotion("First", &["PROVISIONED", "ACTIVE"]),
            promotion("Second", &["EXPIRED"]),
        ];
        let active = CategoryFilter::Exact("ACTIVE".into());
        let out = filter(&promos, &active, "");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title.as_deref(), Some("First"));
        assert_eq!(filter(&promos, &CategoryFilter::All, "sec").len(), 1);
    }

    #[test]
    fn test_aggregate_sum_over_all_records() {
        let records = sample_purchases();
        let total = aggregate_sum(&records, |p| purchase_projection(Projection::InvoicePrice, p));
        assert_eq!(total, 9.98);
        let empty: Vec<PurchaseRecord> = vec![];
        assert_eq!(aggregate_sum(&empty, |p| p.invoice_amount()), 0.0);
    }

    #[test]
    fn test_ledger_projections() {
        let entries = vec![ledger("earned", 100), ledger("used", -40), ledger("used", -10)];
        let sum = |p| aggregate_sum(&entries, |e| ledger_projection(p, e));
        assert_eq!(sum(Projection::PointsChange), 50.0);
        assert_eq!(sum(Projection::PointsEarned), 100.0);
        assert_eq!(sum(Projection::PointsSpent), 50.0);
    }

    #[test]
    fn test_projection_views() {
        assert_eq!(Projection::InvoicePrice.view(), ViewId::Purchases);
        assert_eq!(Projection::RefundAmount.view(), ViewId::Orders);
        assert!(Projection::Tax.is_currency());
        assert!(!Projection::PointsSpent.is_currency());
        assert_eq!(
            Projection::for_view(ViewId::PointsLedger),
            vec![Projection::PointsChange, Projection::PointsEarned, Projection::PointsSpent]
        );
        assert!(Projection::for_view(ViewId::Membership).is_empty());
        assert!(Projection::OrderTotal.check_view(ViewId::Purchases).is_err());
    }
}
