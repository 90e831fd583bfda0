//! Payment Accounting Ledger Repository
//!
//! Append-only journal of money movements. There is deliberately no
//! update or delete function in this module: a correction is a new row.

use super::{RepoError, RepoResult};
use shared::models::{LedgerEntry, NewLedgerEntry};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, presale_id, seller_id, business_day, kind, entry_type, amount, cash_amount, card_amount, method, route, status, created_at";

/// Append exactly one POSTED row for a monetary event.
pub async fn append(conn: &mut SqliteConnection, entry: NewLedgerEntry) -> RepoResult<LedgerEntry> {
    if entry.amount < 0 {
        return Err(RepoError::Validation(format!(
            "Ledger amounts are absolute, got {}",
            entry.amount
        )));
    }
    if entry.cash_amount + entry.card_amount != entry.amount {
        return Err(RepoError::Validation(format!(
            "Ledger split {} + {} does not sum to {}",
            entry.cash_amount, entry.card_amount, entry.amount
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO ledger_entry (id, presale_id, seller_id, business_day, kind, entry_type, amount, cash_amount, card_amount, method, route, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 'POSTED', ?12)",
    )
    .bind(id)
    .bind(entry.presale_id)
    .bind(entry.seller_id)
    .bind(&entry.business_day)
    .bind(entry.kind)
    .bind(entry.entry_type)
    .bind(entry.amount)
    .bind(entry.cash_amount)
    .bind(entry.card_amount)
    .bind(entry.method)
    .bind(entry.route)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let created = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {COLUMNS} FROM ledger_entry WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(created)
}

/// Net (cash, card) collected for a presale: sale entries minus reversals,
/// POSTED rows only. Used to split a reversal the same way the money
/// actually came in.
pub async fn net_split_by_presale(
    conn: &mut SqliteConnection,
    presale_id: i64,
) -> RepoResult<(i64, i64)> {
    let split: (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(CASE WHEN entry_type = 'SALE_CANCEL_REVERSE' THEN -cash_amount ELSE cash_amount END), 0), COALESCE(SUM(CASE WHEN entry_type = 'SALE_CANCEL_REVERSE' THEN -card_amount ELSE card_amount END), 0) FROM ledger_entry WHERE presale_id = ? AND status = 'POSTED'",
    )
    .bind(presale_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(split)
}

pub async fn find_by_presale(pool: &SqlitePool, presale_id: i64) -> RepoResult<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {COLUMNS} FROM ledger_entry WHERE presale_id = ? ORDER BY created_at ASC, id ASC"
    ))
    .bind(presale_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn find_by_business_day(pool: &SqlitePool, day: &str) -> RepoResult<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
        "SELECT {COLUMNS} FROM ledger_entry WHERE business_day = ? ORDER BY created_at ASC, id ASC"
    ))
    .bind(day)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::models::{LedgerEntryType, LedgerKind, LedgerStatus, PaymentMethod};

    fn entry(amount: i64, cash: i64, card: i64) -> NewLedgerEntry {
        NewLedgerEntry {
            presale_id: Some(1),
            seller_id: None,
            business_day: "2025-07-01".into(),
            kind: LedgerKind::SellerShift,
            entry_type: LedgerEntryType::SalePrepaymentCash,
            amount,
            cash_amount: cash,
            card_amount: card,
            method: PaymentMethod::Cash,
            route: None,
        }
    }

    #[tokio::test]
    async fn test_append_posts_row() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let row = append(&mut conn, entry(500, 500, 0)).await.unwrap();
        assert_eq!(row.status, LedgerStatus::Posted);
        assert_eq!(row.amount, 500);
        drop(conn);

        let entries = find_by_business_day(&pool, "2025-07-01").await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_append_rejects_bad_split() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = append(&mut conn, entry(500, 300, 100)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let err = append(&mut conn, entry(-10, -10, 0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
