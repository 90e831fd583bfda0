//! Day Override Model — manual owner record superseding computed aggregates

use serde::{Deserialize, Serialize};

/// Manual figures for one business day.
///
/// While unlocked the owner may correct it; once locked it is immutable,
/// mirroring the ledger's append-only discipline at day grain. A locked
/// override fully supersedes computed aggregates for its day — the two
/// are never blended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DayOverride {
    /// Business day (YYYY-MM-DD), primary key
    pub business_day: String,
    /// Revenue, minor units
    pub revenue: i64,
    pub cash: i64,
    pub card: i64,
    /// Tickets sold that day
    pub tickets: i64,
    pub note: Option<String>,
    pub locked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create/update payload (rejected once the day is locked)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayOverrideUpsert {
    pub business_day: String,
    pub revenue: i64,
    pub cash: i64,
    pub card: i64,
    #[serde(default)]
    pub tickets: i64,
    pub note: Option<String>,
}
