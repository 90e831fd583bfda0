//! Domain error codes
//!
//! Symbolic codes surfaced to API clients so the UI can decide the next
//! action (e.g. prompt a refund-vs-fund decision) instead of parsing
//! human-readable messages.

use serde::{Deserialize, Serialize};

/// Structured domain-conflict codes carried inside error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainErrorCode {
    /// Requested seats exceed the slot's total capacity
    SeatCapacityExceeded,
    /// Requested seats exceed the seats currently remaining
    NoSeats,
    /// Slot reference did not resolve (unknown or inactive)
    SlotNotFound,
    /// Explicit seller id did not resolve to an existing seller
    SellerNotFound,
    /// Prepayment larger than the computed total price
    PrepaymentExceedsTotal,
    /// Top-up would push the collected amount past the total price
    PaymentExceedsRemaining,
    /// MIXED split does not sum to the expected amount
    MixedSplitMismatch,
    /// Nothing outstanding to accept
    NothingOutstanding,
    /// Operation on a presale/ticket in a non-operable status
    InvalidStatus,
    /// Cancellation carries unrefunded prepayment: caller must choose
    /// REFUND or FUND before the operation may proceed
    RefundDecisionRequired,
}

impl DomainErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeatCapacityExceeded => "SEAT_CAPACITY_EXCEEDED",
            Self::NoSeats => "NO_SEATS",
            Self::SlotNotFound => "SLOT_NOT_FOUND",
            Self::SellerNotFound => "SELLER_NOT_FOUND",
            Self::PrepaymentExceedsTotal => "PREPAYMENT_EXCEEDS_TOTAL",
            Self::PaymentExceedsRemaining => "PAYMENT_EXCEEDS_REMAINING",
            Self::MixedSplitMismatch => "MIXED_SPLIT_MISMATCH",
            Self::NothingOutstanding => "NOTHING_OUTSTANDING",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::RefundDecisionRequired => "REFUND_DECISION_REQUIRED",
        }
    }
}

impl std::fmt::Display for DomainErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
