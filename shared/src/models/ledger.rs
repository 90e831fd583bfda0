//! Ledger Entry Model — immutable journal of money movements

use serde::{Deserialize, Serialize};

use super::presale::{PaymentMethod, RefundDecision};

/// Shift bucket of the acting role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerKind {
    SellerShift,
    DispatcherShift,
}

/// Monetary event type.
///
/// Reversals are their own type: aggregation subtracts them explicitly
/// instead of relying on sign conventions baked into storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    SalePrepaymentCash,
    SalePrepaymentCard,
    SalePrepaymentMixed,
    SaleAcceptedCash,
    SaleAcceptedCard,
    SaleAcceptedMixed,
    SaleCancelReverse,
}

impl LedgerEntryType {
    /// Entry type for an initial prepayment or partial top-up
    pub fn prepayment(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::SalePrepaymentCash,
            PaymentMethod::Card => Self::SalePrepaymentCard,
            PaymentMethod::Mixed => Self::SalePrepaymentMixed,
        }
    }

    /// Entry type for a full acceptance of the outstanding remainder
    pub fn accepted(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::SaleAcceptedCash,
            PaymentMethod::Card => Self::SaleAcceptedCard,
            PaymentMethod::Mixed => Self::SaleAcceptedMixed,
        }
    }

    pub fn is_reversal(&self) -> bool {
        matches!(self, Self::SaleCancelReverse)
    }
}

/// Ledger row status. Only POSTED rows count in aggregates; other
/// statuses are retained for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum LedgerStatus {
    #[serde(rename = "POSTED")]
    Posted,
    #[serde(rename = "VOID")]
    Void,
}

/// Ledger entry record. Append-only: a correction is a new entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: i64,
    pub presale_id: Option<i64>,
    pub seller_id: Option<i64>,
    /// Business day bucket (YYYY-MM-DD)
    pub business_day: String,
    pub kind: LedgerKind,
    pub entry_type: LedgerEntryType,
    /// Absolute amount, minor units
    pub amount: i64,
    pub cash_amount: i64,
    pub card_amount: i64,
    pub method: PaymentMethod,
    /// Routing of a reversal (REFUND is subtracted from "collected";
    /// FUND is retained). None for non-reversal entries.
    pub route: Option<RefundDecision>,
    pub status: LedgerStatus,
    pub created_at: i64,
}

/// New ledger entry (id/status/timestamp assigned on append)
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub presale_id: Option<i64>,
    pub seller_id: Option<i64>,
    pub business_day: String,
    pub kind: LedgerKind,
    pub entry_type: LedgerEntryType,
    pub amount: i64,
    pub cash_amount: i64,
    pub card_amount: i64,
    pub method: PaymentMethod,
    pub route: Option<RefundDecision>,
}
