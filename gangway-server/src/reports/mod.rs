//! Owner Reconciliation/Aggregation Layer
//!
//! Pure read side. Every figure comes strictly from the ledger and
//! canonical tables (`POSTED` / `VALID` rows only), with REFUND-routed
//! reversals subtracted explicitly — never from ad hoc recomputation of
//! the sales flow.

pub mod money;
pub mod occupancy;

pub use money::{
    DaySummary, MoneySummary, Reconciliation, boat_breakdown, day_breakdown, reconciliation,
    seller_breakdown, summary,
};
pub use occupancy::{OccupancyItem, occupancy};
