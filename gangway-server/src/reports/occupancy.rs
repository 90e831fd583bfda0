//! Occupancy read model — seats sold vs capacity per slot

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::repository::slot;
use crate::utils::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyItem {
    pub slot_uid: String,
    pub trip_date: String,
    pub start_time: String,
    pub boat_name: Option<String>,
    pub capacity: i64,
    pub seats_sold: i64,
    pub occupancy_pct: f64,
}

/// Per-slot occupancy over an inclusive trip-date range.
pub async fn occupancy(pool: &SqlitePool, from: &str, to: &str) -> AppResult<Vec<OccupancyItem>> {
    let slots = slot::find_by_date_range(pool, from, to).await?;
    Ok(slots
        .into_iter()
        .map(|s| {
            let seats_sold = s.capacity - s.seats_remaining;
            // capacity > 0 is a schema invariant
            let occupancy_pct = (seats_sold as f64 / s.capacity as f64) * 100.0;
            OccupancyItem {
                slot_uid: s.uid().to_string(),
                trip_date: s.trip_date,
                start_time: s.start_time,
                boat_name: s.boat_name,
                capacity: s.capacity,
                seats_sold,
                occupancy_pct,
            }
        })
        .collect())
}
