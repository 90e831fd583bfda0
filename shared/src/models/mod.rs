//! Data models
//!
//! Shared between gangway-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER); all monetary amounts are `i64`
//! minor units of a single implicit currency.

pub mod actor;
pub mod canonical;
pub mod day_override;
pub mod ledger;
pub mod presale;
pub mod seller;
pub mod slot;
pub mod ticket;

// Re-exports
pub use actor::*;
pub use canonical::*;
pub use day_override::*;
pub use ledger::*;
pub use presale::*;
pub use seller::*;
pub use slot::*;
pub use ticket::*;
