//! Slot Model — one sellable occurrence of a boat trip

use serde::{Deserialize, Serialize};

use super::ticket::SeatCategory;

/// Slot origin kind.
///
/// Slots are either produced by the external schedule generator or
/// entered by hand; their numeric id sequences are independent, so the
/// `(kind, id)` pair is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum SlotKind {
    #[serde(rename = "GENERATED")]
    Generated,
    #[serde(rename = "MANUAL")]
    Manual,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "GENERATED",
            Self::Manual => "MANUAL",
        }
    }

    /// Parse from a path/uid segment, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GENERATED" => Some(Self::Generated),
            "MANUAL" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Composite slot identifier, rendered as `generated:123` / `manual:45`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotUid {
    pub kind: SlotKind,
    pub id: i64,
}

impl SlotUid {
    pub fn new(kind: SlotKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for SlotUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            SlotKind::Generated => "generated",
            SlotKind::Manual => "manual",
        };
        write!(f, "{}:{}", kind, self.id)
    }
}

impl std::str::FromStr for SlotUid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid slot uid: {s}"))?;
        let kind = SlotKind::parse(kind).ok_or_else(|| format!("Invalid slot kind: {kind}"))?;
        let id: i64 = id
            .parse()
            .map_err(|_| format!("Invalid slot id: {id}"))?;
        Ok(Self { kind, id })
    }
}

// serde as the "kind:id" string (wire payloads reference slots by uid)
impl Serialize for SlotUid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SlotUid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Slot record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Slot {
    pub id: i64,
    pub kind: SlotKind,
    /// Trip date in the business timezone (YYYY-MM-DD)
    pub trip_date: String,
    /// Departure time (HH:MM)
    pub start_time: String,
    /// Trip duration in minutes, if fixed
    pub duration_min: Option<i64>,
    /// Boat name (owner reports group by it)
    pub boat_name: Option<String>,
    pub capacity: i64,
    pub seats_remaining: i64,
    /// Per-category prices, minor units
    pub price_adult: i64,
    pub price_teen: i64,
    pub price_child: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Slot {
    pub fn uid(&self) -> SlotUid {
        SlotUid::new(self.kind, self.id)
    }

    pub fn price_for(&self, category: SeatCategory) -> i64 {
        match category {
            SeatCategory::Adult => self.price_adult,
            SeatCategory::Teen => self.price_teen,
            SeatCategory::Child => self.price_child,
        }
    }
}

/// Create slot payload (manual slots, or rows fed by the schedule generator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotCreate {
    /// Explicit id (schedule generator supplies its own); omitted → generated
    pub id: Option<i64>,
    pub kind: SlotKind,
    pub trip_date: String,
    pub start_time: String,
    pub duration_min: Option<i64>,
    pub boat_name: Option<String>,
    pub capacity: i64,
    pub price_adult: i64,
    pub price_teen: i64,
    pub price_child: i64,
}

/// Update slot payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotUpdate {
    pub start_time: Option<String>,
    pub duration_min: Option<i64>,
    pub boat_name: Option<String>,
    pub price_adult: Option<i64>,
    pub price_teen: Option<i64>,
    pub price_child: Option<i64>,
    pub is_active: Option<bool>,
}
