//! Canonical Transaction Repository
//!
//! Reporting projection of the ledger: one row per POSTED monetary sale
//! event, numerically identical to the ledger's POSTED subset.
//! Cancellation re-tags rows (VOID on refund, fund-tag on fund) instead
//! of deleting them.

use super::RepoResult;
use shared::models::{CanonicalTransaction, PaymentMethod};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str =
    "id, presale_id, amount, business_day, method, fund_routed, status, created_at";

/// Mirror one monetary event. `amount` is signed: partial reversals
/// project as negative rows so the VALID sum tracks the ledger net.
pub async fn append(
    conn: &mut SqliteConnection,
    presale_id: i64,
    amount: i64,
    business_day: &str,
    method: PaymentMethod,
) -> RepoResult<CanonicalTransaction> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO canonical_transaction (id, presale_id, amount, business_day, method, fund_routed, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, 'VALID', ?6)",
    )
    .bind(id)
    .bind(presale_id)
    .bind(amount)
    .bind(business_day)
    .bind(method)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let created = sqlx::query_as::<_, CanonicalTransaction>(&format!(
        "SELECT {COLUMNS} FROM canonical_transaction WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(created)
}

/// Re-tag all of a presale's rows VOID (refund cancellation).
pub async fn void_by_presale(conn: &mut SqliteConnection, presale_id: i64) -> RepoResult<i64> {
    let rows = sqlx::query(
        "UPDATE canonical_transaction SET status = 'VOID' WHERE presale_id = ? AND status = 'VALID'",
    )
    .bind(presale_id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() as i64)
}

/// Tag all of a presale's rows as fund-routed (fund cancellation):
/// the money stays counted, marked as retained.
pub async fn tag_fund_by_presale(conn: &mut SqliteConnection, presale_id: i64) -> RepoResult<i64> {
    let rows = sqlx::query(
        "UPDATE canonical_transaction SET fund_routed = 1 WHERE presale_id = ? AND status = 'VALID'",
    )
    .bind(presale_id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() as i64)
}

pub async fn find_by_presale(
    pool: &SqlitePool,
    presale_id: i64,
) -> RepoResult<Vec<CanonicalTransaction>> {
    let rows = sqlx::query_as::<_, CanonicalTransaction>(&format!(
        "SELECT {COLUMNS} FROM canonical_transaction WHERE presale_id = ? ORDER BY created_at ASC, id ASC"
    ))
    .bind(presale_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Aggregate used by the owner's reconciliation: VALID rows only.
pub async fn valid_sum_by_day(pool: &SqlitePool, day: &str) -> RepoResult<i64> {
    let sum: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM canonical_transaction WHERE business_day = ? AND status = 'VALID'",
    )
    .bind(day)
    .fetch_one(pool)
    .await?;
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::models::CanonicalStatus;

    #[tokio::test]
    async fn test_append_and_sum() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, 500, "2025-07-01", PaymentMethod::Cash)
            .await
            .unwrap();
        append(&mut conn, 1, 1000, "2025-07-01", PaymentMethod::Card)
            .await
            .unwrap();
        append(&mut conn, 2, 700, "2025-07-02", PaymentMethod::Cash)
            .await
            .unwrap();
        drop(conn);

        assert_eq!(valid_sum_by_day(&pool, "2025-07-01").await.unwrap(), 1500);
        assert_eq!(valid_sum_by_day(&pool, "2025-07-02").await.unwrap(), 700);
    }

    #[tokio::test]
    async fn test_void_drops_from_sum_but_keeps_rows() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, 500, "2025-07-01", PaymentMethod::Cash)
            .await
            .unwrap();
        append(&mut conn, 1, 1000, "2025-07-01", PaymentMethod::Cash)
            .await
            .unwrap();

        let voided = void_by_presale(&mut conn, 1).await.unwrap();
        assert_eq!(voided, 2);
        drop(conn);

        assert_eq!(valid_sum_by_day(&pool, "2025-07-01").await.unwrap(), 0);
        // Audit trail preserved
        let rows = find_by_presale(&pool, 1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.status == CanonicalStatus::Void));
    }

    #[tokio::test]
    async fn test_fund_tag_keeps_sum() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, 500, "2025-07-01", PaymentMethod::Cash)
            .await
            .unwrap();
        tag_fund_by_presale(&mut conn, 1).await.unwrap();
        drop(conn);

        assert_eq!(valid_sum_by_day(&pool, "2025-07-01").await.unwrap(), 500);
        let rows = find_by_presale(&pool, 1).await.unwrap();
        assert!(rows[0].fund_routed);
    }

    #[tokio::test]
    async fn test_negative_adjustment_mirrors_partial_reversal() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        append(&mut conn, 1, 1500, "2025-07-01", PaymentMethod::Cash)
            .await
            .unwrap();
        append(&mut conn, 1, -500, "2025-07-01", PaymentMethod::Cash)
            .await
            .unwrap();
        drop(conn);

        assert_eq!(valid_sum_by_day(&pool, "2025-07-01").await.unwrap(), 1000);
    }
}
