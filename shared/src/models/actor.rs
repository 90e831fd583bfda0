//! Actor context — who is performing an operation
//!
//! Session issuance is out of scope; the upstream layer hands the acting
//! role and seller identity to the engine (`X-Actor-Role`/`X-Actor-Id`
//! headers at the HTTP boundary).

use serde::{Deserialize, Serialize};

use super::ledger::LedgerKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Seller,
    Dispatcher,
    Owner,
}

impl ActorRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELLER" => Some(Self::Seller),
            "DISPATCHER" => Some(Self::Dispatcher),
            "OWNER" => Some(Self::Owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: ActorRole,
    /// Seller identity of the actor, when acting as one
    pub seller_id: Option<i64>,
}

impl Actor {
    pub fn seller(seller_id: Option<i64>) -> Self {
        Self {
            role: ActorRole::Seller,
            seller_id,
        }
    }

    pub fn dispatcher() -> Self {
        Self {
            role: ActorRole::Dispatcher,
            seller_id: None,
        }
    }

    /// Shift bucket this actor's monetary events book under.
    pub fn ledger_kind(&self) -> LedgerKind {
        match self.role {
            ActorRole::Dispatcher => LedgerKind::DispatcherShift,
            _ => LedgerKind::SellerShift,
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::seller(None)
    }
}
