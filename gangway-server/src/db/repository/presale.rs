//! Presale Repository
//!
//! Owns the presale row and its payment-state transitions. All monetary
//! mutations are guarded UPDATEs: the bound check lives in the WHERE
//! clause, so two racing writers can never drive `prepayment_amount`
//! past `total_price`.

use super::{RepoError, RepoResult};
use shared::DomainErrorCode;
use shared::models::{PaymentMethod, Presale, PresaleStatus, SlotUid};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, slot_kind, slot_id, customer_name, customer_phone, number_of_seats, total_price, prepayment_amount, payment_method, payment_cash_amount, payment_card_amount, status, seller_id, business_day, note, created_at, updated_at";

pub async fn insert(conn: &mut SqliteConnection, presale: &Presale) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO presale (id, slot_kind, slot_id, customer_name, customer_phone, number_of_seats, total_price, prepayment_amount, payment_method, payment_cash_amount, payment_card_amount, status, seller_id, business_day, note, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
    )
    .bind(presale.id)
    .bind(presale.slot_kind)
    .bind(presale.slot_id)
    .bind(&presale.customer_name)
    .bind(&presale.customer_phone)
    .bind(presale.number_of_seats)
    .bind(presale.total_price)
    .bind(presale.prepayment_amount)
    .bind(presale.payment_method)
    .bind(presale.payment_cash_amount)
    .bind(presale.payment_card_amount)
    .bind(presale.status)
    .bind(presale.seller_id)
    .bind(&presale.business_day)
    .bind(&presale.note)
    .bind(presale.created_at)
    .bind(presale.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Presale>> {
    let presale =
        sqlx::query_as::<_, Presale>(&format!("SELECT {COLUMNS} FROM presale WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(presale)
}

/// Transaction-scoped variant of [`find_by_id`]
pub async fn find_by_id_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Presale>> {
    let presale =
        sqlx::query_as::<_, Presale>(&format!("SELECT {COLUMNS} FROM presale WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(presale)
}

/// Fetch an operable (ACTIVE) presale or fail with the status in the message.
pub async fn find_operable(conn: &mut SqliteConnection, id: i64) -> RepoResult<Presale> {
    let presale = find_by_id_tx(conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Presale {id} not found")))?;
    if presale.status != PresaleStatus::Active {
        return Err(RepoError::Domain(
            DomainErrorCode::InvalidStatus,
            format!(
                "Presale {id} is {} and cannot be operated on",
                presale.status.as_str()
            ),
        ));
    }
    Ok(presale)
}

pub async fn find_by_slot(pool: &SqlitePool, uid: SlotUid) -> RepoResult<Vec<Presale>> {
    let presales = sqlx::query_as::<_, Presale>(&format!(
        "SELECT {COLUMNS} FROM presale WHERE slot_kind = ? AND slot_id = ? ORDER BY created_at ASC"
    ))
    .bind(uid.kind)
    .bind(uid.id)
    .fetch_all(pool)
    .await?;
    Ok(presales)
}

pub async fn find_by_business_day(pool: &SqlitePool, day: &str) -> RepoResult<Vec<Presale>> {
    let presales = sqlx::query_as::<_, Presale>(&format!(
        "SELECT {COLUMNS} FROM presale WHERE business_day = ? ORDER BY created_at ASC"
    ))
    .bind(day)
    .fetch_all(pool)
    .await?;
    Ok(presales)
}

/// Record a partial top-up of exactly `amount`.
///
/// The `prepayment_amount + ? <= total_price` guard serializes concurrent
/// top-ups; the sum can never exceed the total.
pub async fn add_prepayment(conn: &mut SqliteConnection, id: i64, amount: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE presale SET prepayment_amount = prepayment_amount + ?1, updated_at = ?2 WHERE id = ?3 AND status = 'ACTIVE' AND prepayment_amount + ?1 <= total_price",
    )
    .bind(amount)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        let presale = find_operable(conn, id).await?;
        return Err(RepoError::Domain(
            DomainErrorCode::PaymentExceedsRemaining,
            format!(
                "Top-up of {amount} exceeds remaining {} on presale {id}",
                presale.remaining()
            ),
        ));
    }
    Ok(())
}

/// Complete payment to the outstanding remainder.
///
/// Compare-and-swap on the remainder the caller computed: if another
/// payment landed in between, the guard fails instead of over-collecting.
/// The cash/card fields record this acceptance event's split.
pub async fn accept_payment(
    conn: &mut SqliteConnection,
    id: i64,
    method: PaymentMethod,
    cash_amount: i64,
    card_amount: i64,
    expected_remaining: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE presale SET prepayment_amount = total_price, payment_method = ?1, payment_cash_amount = ?2, payment_card_amount = ?3, updated_at = ?4 WHERE id = ?5 AND status = 'ACTIVE' AND total_price - prepayment_amount = ?6",
    )
    .bind(method)
    .bind(cash_amount)
    .bind(card_amount)
    .bind(now)
    .bind(id)
    .bind(expected_remaining)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        // Either terminal status or a concurrent payment changed the remainder
        find_operable(conn, id).await?;
        return Err(RepoError::Conflict(format!(
            "Payment state of presale {id} changed concurrently"
        )));
    }
    Ok(())
}

/// Terminal transition ACTIVE → CANCELLED. Fails cleanly on an already
/// cancelled presale so seats are never double-released.
pub async fn mark_cancelled(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows =
        sqlx::query("UPDATE presale SET status = 'CANCELLED', updated_at = ?1 WHERE id = ?2 AND status = 'ACTIVE'")
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;

    if rows.rows_affected() == 0 {
        find_operable(conn, id).await?;
        return Err(RepoError::Database(format!(
            "Failed to cancel presale {id}"
        )));
    }
    Ok(())
}

/// Recompute stored seat count / total after a ticket-level change.
pub async fn update_seats_and_total(
    conn: &mut SqliteConnection,
    id: i64,
    number_of_seats: i64,
    total_price: i64,
    prepayment_amount: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE presale SET number_of_seats = ?1, total_price = ?2, prepayment_amount = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(number_of_seats)
    .bind(total_price)
    .bind(prepayment_amount)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Re-point a presale at a new slot (transfer), updating the business day.
pub async fn update_slot_ref(
    conn: &mut SqliteConnection,
    id: i64,
    target: SlotUid,
    business_day: &str,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE presale SET slot_kind = ?1, slot_id = ?2, business_day = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(target.kind)
    .bind(target.id)
    .bind(business_day)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    async fn seed_presale(pool: &SqlitePool, id: i64, total: i64, prepaid: i64) {
        sqlx::query(
            "INSERT INTO presale (id, slot_kind, slot_id, customer_name, customer_phone, number_of_seats, total_price, prepayment_amount, business_day, created_at, updated_at) VALUES (?1, 'GENERATED', 1, 'Marta', '600000001', 2, ?2, ?3, '2025-07-01', 0, 0)",
        )
        .bind(id)
        .bind(total)
        .bind(prepaid)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_add_prepayment_within_bound() {
        let pool = test_pool().await;
        seed_presale(&pool, 1, 1500, 500).await;

        let mut conn = pool.acquire().await.unwrap();
        add_prepayment(&mut conn, 1, 700).await.unwrap();
        drop(conn);

        let p = find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(p.prepayment_amount, 1200);
        assert_eq!(p.remaining(), 300);
    }

    #[tokio::test]
    async fn test_add_prepayment_exceeding_rejected() {
        let pool = test_pool().await;
        seed_presale(&pool, 1, 1500, 500).await;

        let mut conn = pool.acquire().await.unwrap();
        let err = add_prepayment(&mut conn, 1, 1001).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::PaymentExceedsRemaining, _)
        ));
        drop(conn);

        let p = find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(p.prepayment_amount, 500); // untouched
    }

    #[tokio::test]
    async fn test_accept_payment_cas() {
        let pool = test_pool().await;
        seed_presale(&pool, 1, 1500, 500).await;

        let mut conn = pool.acquire().await.unwrap();
        accept_payment(&mut conn, 1, PaymentMethod::Cash, 1000, 0, 1000)
            .await
            .unwrap();
        drop(conn);

        let p = find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(p.prepayment_amount, 1500);
        assert_eq!(p.payment_cash_amount, 1000);
        assert_eq!(p.payment_method, Some(PaymentMethod::Cash));
    }

    #[tokio::test]
    async fn test_accept_payment_stale_remainder_conflicts() {
        let pool = test_pool().await;
        seed_presale(&pool, 1, 1500, 500).await;

        let mut conn = pool.acquire().await.unwrap();
        // Simulates a racing top-up between read and accept
        add_prepayment(&mut conn, 1, 200).await.unwrap();
        let err = accept_payment(&mut conn, 1, PaymentMethod::Cash, 1000, 0, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_mark_cancelled_is_terminal() {
        let pool = test_pool().await;
        seed_presale(&pool, 1, 1500, 0).await;

        let mut conn = pool.acquire().await.unwrap();
        mark_cancelled(&mut conn, 1).await.unwrap();
        let err = mark_cancelled(&mut conn, 1).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::InvalidStatus, _)
        ));

        let err = add_prepayment(&mut conn, 1, 100).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::InvalidStatus, _)
        ));
    }

    #[tokio::test]
    async fn test_unknown_presale_not_found() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = add_prepayment(&mut conn, 42, 100).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
