use std::fmt;

use clap::ValueEnum;

use crate::models::RecordType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ViewId {
    /// Nothing loaded yet
    #[value(skip)]
    Empty,
    Membership,
    #[value(name = "points")]
    PointsLedger,
    Purchases,
    Promotions,
    Orders,
}

/// Tab order, which is also the initial-view priority.
pub const VIEW_PRIORITY: &[ViewId] = &[
    ViewId::Membership,
    ViewId::PointsLedger,
    ViewId::Purchases,
    ViewId::Promotions,
    ViewId::Orders,
];

impl ViewId {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Empty => "Nothing loaded",
            Self::Membership => "Membership",
            Self::PointsLedger => "Points History",
            Self::Purchases => "Purchase History",
            Self::Promotions => "Promotion History",
            Self::Orders => "Order History",
        }
    }

    /// Plural noun used in "Showing N of M ..." lines.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Empty => "records",
            Self::Membership => "memberships",
            Self::PointsLedger => "transactions",
            Self::Purchases => "purchases",
            Self::Promotions => "promotions",
            Self::Orders => "orders",
        }
    }

    /// View that shows records of a detected type.
    pub fn for_record_type(kind: RecordType) -> Self {
        match kind {
            RecordType::Membership => Self::Membership,
            RecordType::PointsLedgerEntry => Self::PointsLedger,
            RecordType::PurchaseRecord => Self::Purchases,
            RecordType::PromotionRecord => Self::Promotions,
            RecordType::OrderRecord => Self::Orders,
            RecordType::Unknown => Self::Empty,
        }
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    pub membership: bool,
    pub ledger_count: usize,
    pub purchase_count: usize,
    pub promotion_count: usize,
    pub order_count: usize,
}

impl Presence {
    pub fn has(&self, view: ViewId) -> bool {
        match view {
            ViewId::Empty => false,
            ViewId::Membership => self.membership,
            ViewId::PointsLedger => self.ledger_count > 0,
            ViewId::Purchases => self.purchase_count > 0,
            ViewId::Promotions => self.promotion_count > 0,
            ViewId::Orders => self.order_count > 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        !VIEW_PRIORITY.iter().any(|v| self.has(*v))
    }
}

/// First populated view by priority, or `Empty`.
pub fn select_initial_view(presence: &Presence) -> ViewId {
    VIEW_PRIORITY
        .iter()
        .copied()
        .find(|v| presence.has(*v))
        .unwrap_or(ViewId::Empty)
}

/// Views backed by data, in tab order. Unpopulated views are left out.
pub fn available_views(presence: &Presence) -> Vec<ViewId> {
    VIEW_PRIORITY
        .iter()
        .copied()
        .filter(|v| presence.has(*v))
        .collect()
}
