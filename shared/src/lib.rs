//! Shared types for the Gangway ticketing engine
//!
//! Data models and wire payloads used by the server and its API clients,
//! plus small utilities (timestamps, id generation) shared across crates.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::DomainErrorCode;
pub use serde::{Deserialize, Serialize};
