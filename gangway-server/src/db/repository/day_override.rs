//! Day Override Repository
//!
//! Manual owner figures for a business day. Writable until locked; a
//! locked record is immutable, so the lock guard lives in the WHERE
//! clause of every mutation.

use super::{RepoError, RepoResult};
use shared::models::{DayOverride, DayOverrideUpsert};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "business_day, revenue, cash, card, tickets, note, locked, created_at, updated_at";

fn validate(data: &DayOverrideUpsert) -> RepoResult<()> {
    for (field, value) in [
        ("revenue", data.revenue),
        ("cash", data.cash),
        ("card", data.card),
        ("tickets", data.tickets),
    ] {
        if value < 0 {
            return Err(RepoError::Validation(format!(
                "{field} cannot be negative: {value}"
            )));
        }
    }
    crate::utils::time::parse_date(&data.business_day)
        .map_err(|_| RepoError::Validation(format!("Invalid date: {}", data.business_day)))?;
    Ok(())
}

pub async fn find_by_day(pool: &SqlitePool, day: &str) -> RepoResult<Option<DayOverride>> {
    let row = sqlx::query_as::<_, DayOverride>(&format!(
        "SELECT {COLUMNS} FROM day_override WHERE business_day = ?"
    ))
    .bind(day)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find_range(pool: &SqlitePool, from: &str, to: &str) -> RepoResult<Vec<DayOverride>> {
    let rows = sqlx::query_as::<_, DayOverride>(&format!(
        "SELECT {COLUMNS} FROM day_override WHERE business_day >= ? AND business_day <= ? ORDER BY business_day ASC"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Create or correct the record for a day. Rejected once locked.
pub async fn upsert(pool: &SqlitePool, data: DayOverrideUpsert) -> RepoResult<DayOverride> {
    validate(&data)?;
    let now = shared::util::now_millis();

    if let Some(existing) = find_by_day(pool, &data.business_day).await? {
        if existing.locked {
            return Err(RepoError::Conflict(format!(
                "Day override for {} is locked",
                data.business_day
            )));
        }
        // locked = 0 guard repeated in SQL against a concurrent lock
        let rows = sqlx::query(
            "UPDATE day_override SET revenue = ?1, cash = ?2, card = ?3, tickets = ?4, note = ?5, updated_at = ?6 WHERE business_day = ?7 AND locked = 0",
        )
        .bind(data.revenue)
        .bind(data.cash)
        .bind(data.card)
        .bind(data.tickets)
        .bind(&data.note)
        .bind(now)
        .bind(&data.business_day)
        .execute(pool)
        .await?;
        if rows.rows_affected() == 0 {
            return Err(RepoError::Conflict(format!(
                "Day override for {} is locked",
                data.business_day
            )));
        }
    } else {
        sqlx::query(
            "INSERT INTO day_override (business_day, revenue, cash, card, tickets, note, locked, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
        )
        .bind(&data.business_day)
        .bind(data.revenue)
        .bind(data.cash)
        .bind(data.card)
        .bind(data.tickets)
        .bind(&data.note)
        .bind(now)
        .execute(pool)
        .await?;
    }

    find_by_day(pool, &data.business_day)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to upsert day override".into()))
}

/// Finalize the record. From here on it supersedes computed aggregates
/// and can never be written again.
pub async fn lock(pool: &SqlitePool, day: &str) -> RepoResult<DayOverride> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE day_override SET locked = 1, updated_at = ?1 WHERE business_day = ?2 AND locked = 0",
    )
    .bind(now)
    .bind(day)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return match find_by_day(pool, day).await? {
            Some(_) => Err(RepoError::Conflict(format!(
                "Day override for {day} is already locked"
            ))),
            None => Err(RepoError::NotFound(format!(
                "No day override for {day}"
            ))),
        };
    }
    find_by_day(pool, day)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("No day override for {day}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn upsert_data(day: &str, revenue: i64) -> DayOverrideUpsert {
        DayOverrideUpsert {
            business_day: day.into(),
            revenue,
            cash: revenue,
            card: 0,
            tickets: 10,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_then_correct() {
        let pool = test_pool().await;
        upsert(&pool, upsert_data("2025-07-01", 10000)).await.unwrap();
        let row = upsert(&pool, upsert_data("2025-07-01", 12000)).await.unwrap();
        assert_eq!(row.revenue, 12000);
        assert!(!row.locked);
    }

    #[tokio::test]
    async fn test_locked_is_immutable() {
        let pool = test_pool().await;
        upsert(&pool, upsert_data("2025-07-01", 10000)).await.unwrap();
        let locked = lock(&pool, "2025-07-01").await.unwrap();
        assert!(locked.locked);

        let err = upsert(&pool, upsert_data("2025-07-01", 999)).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        let err = lock(&pool, "2025-07-01").await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        let row = find_by_day(&pool, "2025-07-01").await.unwrap().unwrap();
        assert_eq!(row.revenue, 10000);
    }

    #[tokio::test]
    async fn test_lock_unknown_day() {
        let pool = test_pool().await;
        let err = lock(&pool, "2025-07-01").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let pool = test_pool().await;
        let err = upsert(&pool, upsert_data("01/07/2025", 1)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let mut bad = upsert_data("2025-07-01", 1);
        bad.cash = -5;
        let err = upsert(&pool, bad).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
