//! Ticket Model — one seat unit within a presale

use serde::{Deserialize, Serialize};

use super::slot::SlotKind;

/// Ticket status (terminal: REFUNDED)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum TicketStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "REFUNDED")]
    Refunded,
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Seat price category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum SeatCategory {
    #[serde(rename = "ADULT")]
    Adult,
    #[serde(rename = "TEEN")]
    Teen,
    #[serde(rename = "CHILD")]
    Child,
}

/// Ticket record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ticket {
    pub id: i64,
    pub presale_id: i64,
    /// Denormalized slot reference for fast boarding-list lookup
    pub slot_kind: SlotKind,
    pub slot_id: i64,
    /// Opaque unique code printed on the stub
    pub code: String,
    pub category: SeatCategory,
    /// Price at sale time, minor units
    pub price: i64,
    pub status: TicketStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Boarding-list row: active ticket joined with its presale's customer data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BoardingItem {
    pub ticket_id: i64,
    pub code: String,
    pub category: SeatCategory,
    pub price: i64,
    pub presale_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub number_of_seats: i64,
    pub prepayment_amount: i64,
    pub total_price: i64,
}

/// Outcome of a single-ticket deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDeleteResult {
    pub ticket_id: i64,
    /// Updated (or cancelled) owning presale
    pub presale: super::presale::Presale,
    /// True when this was the last active ticket and the presale was
    /// cancelled as a consequence
    pub presale_cancelled: bool,
}
