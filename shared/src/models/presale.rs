//! Presale Model — a customer's booking against one slot

use serde::{Deserialize, Serialize};

use super::slot::{SlotKind, SlotUid};

/// Presale status (terminal: CANCELLED; rows are never hard-deleted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PresaleStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

impl Default for PresaleStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl PresaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Payment method tag (categorical; gateways are out of scope)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentMethod {
    #[serde(rename = "CASH")]
    Cash,
    #[serde(rename = "CARD")]
    Card,
    #[serde(rename = "MIXED")]
    Mixed,
}

/// Routing decision for reversed prepayment money.
///
/// REFUND hands the money back to the customer; FUND retains it in the
/// business fund. Never inferred — the caller must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum RefundDecision {
    #[serde(rename = "REFUND")]
    Refund,
    #[serde(rename = "FUND")]
    Fund,
}

/// Presale record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Presale {
    pub id: i64,
    pub slot_kind: SlotKind,
    pub slot_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub number_of_seats: i64,
    /// Total price of the active tickets, minor units
    pub total_price: i64,
    /// Amount collected so far, minor units
    pub prepayment_amount: i64,
    /// Method of the acceptance event (set when payment completes)
    pub payment_method: Option<PaymentMethod>,
    /// Cash part of the acceptance event
    pub payment_cash_amount: i64,
    /// Card part of the acceptance event
    pub payment_card_amount: i64,
    pub status: PresaleStatus,
    /// Assigned seller; None when sold unassigned
    pub seller_id: Option<i64>,
    /// Business day bucket (slot's local trip date, YYYY-MM-DD)
    pub business_day: String,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Presale {
    pub fn slot_uid(&self) -> SlotUid {
        SlotUid::new(self.slot_kind, self.slot_id)
    }

    /// Outstanding remainder still to be collected
    pub fn remaining(&self) -> i64 {
        self.total_price - self.prepayment_amount
    }
}

/// Seat count per price category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SeatBreakdown {
    #[serde(default)]
    pub adult: i64,
    #[serde(default)]
    pub teen: i64,
    #[serde(default)]
    pub child: i64,
}

impl SeatBreakdown {
    pub fn seats(&self) -> i64 {
        self.adult + self.teen + self.child
    }
}

/// Create presale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresaleCreate {
    pub slot_uid: SlotUid,
    pub customer_name: String,
    pub customer_phone: String,
    pub breakdown: SeatBreakdown,
    /// Initial collected amount (0 = book now, pay later)
    #[serde(default)]
    pub prepayment_amount: i64,
    /// Method of the initial prepayment (required when prepayment > 0)
    pub payment_method: Option<PaymentMethod>,
    /// MIXED prepayment split
    pub cash_amount: Option<i64>,
    pub card_amount: Option<i64>,
    /// Explicit seller; omitted → the acting seller
    pub seller_id: Option<i64>,
    pub note: Option<String>,
}

/// Partial top-up payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentUpdate {
    /// Incremental amount, minor units (strictly positive)
    pub amount: i64,
    pub method: PaymentMethod,
}

/// Accept-payment payload — completes payment to the outstanding remainder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAccept {
    pub method: PaymentMethod,
    /// MIXED split (must sum to the remainder)
    pub cash_amount: Option<i64>,
    pub card_amount: Option<i64>,
}

/// Cancel-presale payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresaleCancel {
    /// Required when the presale carries unrefunded prepayment
    pub decision: Option<RefundDecision>,
}

/// Transfer payload (presale- or ticket-level)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub target_slot_uid: SlotUid,
}

/// Transfer outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub moved_seats: i64,
    /// Business days whose aggregates dependent read-models must refresh
    pub affected_business_days: Vec<String>,
    pub presale: Presale,
}
