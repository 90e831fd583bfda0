//! Canonical Transaction Model — reporting projection of the ledger

use serde::{Deserialize, Serialize};

use super::presale::PaymentMethod;

/// Canonical row status. VALID rows are the only ones counted in
/// aggregates; VOID rows are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum CanonicalStatus {
    #[serde(rename = "VALID")]
    Valid,
    #[serde(rename = "VOID")]
    Void,
}

/// Canonical transaction: one row per POSTED monetary sale event,
/// numerically identical to the ledger's POSTED subset.
///
/// Negative amounts mirror partial reversals so `SUM(amount)` over VALID
/// rows stays equal to the ledger's net collected figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CanonicalTransaction {
    pub id: i64,
    pub presale_id: i64,
    /// Signed amount, minor units
    pub amount: i64,
    /// Business day of the collection event (YYYY-MM-DD)
    pub business_day: String,
    pub method: PaymentMethod,
    /// Money retained via a FUND cancellation decision
    pub fund_routed: bool,
    pub status: CanonicalStatus,
    pub created_at: i64,
}
