//! Ticket Repository
//!
//! One row per seat unit. Tickets are created in a batch with their
//! presale and only ever transition ACTIVE → REFUNDED (terminal).

use super::{RepoError, RepoResult};
use shared::DomainErrorCode;
use shared::models::{BoardingItem, SlotUid, Ticket};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str =
    "id, presale_id, slot_kind, slot_id, code, category, price, status, created_at, updated_at";

pub async fn insert_batch(conn: &mut SqliteConnection, tickets: &[Ticket]) -> RepoResult<()> {
    for ticket in tickets {
        sqlx::query(
            "INSERT INTO ticket (id, presale_id, slot_kind, slot_id, code, category, price, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(ticket.id)
        .bind(ticket.presale_id)
        .bind(ticket.slot_kind)
        .bind(ticket.slot_id)
        .bind(&ticket.code)
        .bind(ticket.category)
        .bind(ticket.price)
        .bind(ticket.status)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!("SELECT {COLUMNS} FROM ticket WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

/// Transaction-scoped variant of [`find_by_id`]
pub async fn find_by_id_tx(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!("SELECT {COLUMNS} FROM ticket WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(ticket)
}

pub async fn find_active_by_presale(
    conn: &mut SqliteConnection,
    presale_id: i64,
) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM ticket WHERE presale_id = ? AND status = 'ACTIVE' ORDER BY id ASC"
    ))
    .bind(presale_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(tickets)
}

pub async fn find_by_presale(pool: &SqlitePool, presale_id: i64) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM ticket WHERE presale_id = ? ORDER BY id ASC"
    ))
    .bind(presale_id)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

/// Boarding list for the dispatcher: active tickets on a slot joined with
/// their presale's customer data. REFUNDED tickets are excluded.
pub async fn boarding_list(pool: &SqlitePool, uid: SlotUid) -> RepoResult<Vec<BoardingItem>> {
    let items = sqlx::query_as::<_, BoardingItem>(
        "SELECT t.id AS ticket_id, t.code, t.category, t.price, p.id AS presale_id, p.customer_name, p.customer_phone, p.number_of_seats, p.prepayment_amount, p.total_price FROM ticket t JOIN presale p ON p.id = t.presale_id WHERE t.slot_kind = ?1 AND t.slot_id = ?2 AND t.status = 'ACTIVE' ORDER BY p.customer_name ASC, t.id ASC",
    )
    .bind(uid.kind)
    .bind(uid.id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Terminal transition ACTIVE → REFUNDED. Fails cleanly on an already
/// refunded ticket so seats are never double-released.
pub async fn mark_refunded(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE ticket SET status = 'REFUNDED', updated_at = ?1 WHERE id = ?2 AND status = 'ACTIVE'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        if find_by_id_tx(conn, id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Ticket {id} not found")));
        }
        return Err(RepoError::Domain(
            DomainErrorCode::InvalidStatus,
            format!("Ticket {id} is already REFUNDED"),
        ));
    }
    Ok(())
}

/// Refund every remaining active ticket of a presale (full cancellation).
/// Returns the number of tickets transitioned.
pub async fn mark_refunded_by_presale(
    conn: &mut SqliteConnection,
    presale_id: i64,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE ticket SET status = 'REFUNDED', updated_at = ?1 WHERE presale_id = ?2 AND status = 'ACTIVE'",
    )
    .bind(now)
    .bind(presale_id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() as i64)
}

/// Re-point a ticket at a new slot with its repriced category price
/// (ticket-level transfer).
pub async fn update_slot_ref(
    conn: &mut SqliteConnection,
    id: i64,
    target: SlotUid,
    price: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE ticket SET slot_kind = ?1, slot_id = ?2, price = ?3, updated_at = ?4 WHERE id = ?5",
    )
    .bind(target.kind)
    .bind(target.id)
    .bind(price)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Re-point a presale's active tickets from `source` to `target`
/// (presale-level transfer). Tickets already moved to a third slot by a
/// partial transfer keep their seat there. Prices are kept — the presale
/// carries its payment state unchanged.
pub async fn update_slot_ref_by_presale(
    conn: &mut SqliteConnection,
    presale_id: i64,
    source: SlotUid,
    target: SlotUid,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE ticket SET slot_kind = ?1, slot_id = ?2, updated_at = ?3 WHERE presale_id = ?4 AND status = 'ACTIVE' AND slot_kind = ?5 AND slot_id = ?6",
    )
    .bind(target.kind)
    .bind(target.id)
    .bind(now)
    .bind(presale_id)
    .bind(source.kind)
    .bind(source.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn count_active_by_slot(pool: &SqlitePool, uid: SlotUid) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM ticket WHERE slot_kind = ? AND slot_id = ? AND status = 'ACTIVE'",
    )
    .bind(uid.kind)
    .bind(uid.id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::models::{SeatCategory, SlotKind, TicketStatus};

    fn ticket(id: i64, presale_id: i64, price: i64) -> Ticket {
        Ticket {
            id,
            presale_id,
            slot_kind: SlotKind::Generated,
            slot_id: 1,
            code: shared::util::ticket_code(),
            category: SeatCategory::Adult,
            price,
            status: TicketStatus::Active,
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn seed_presale(pool: &SqlitePool, id: i64) {
        sqlx::query(
            "INSERT INTO presale (id, slot_kind, slot_id, customer_name, customer_phone, number_of_seats, total_price, business_day, created_at, updated_at) VALUES (?1, 'GENERATED', 1, 'Jordi', '600000002', 2, 5000, '2025-07-01', 0, 0)",
        )
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_insert_batch_and_list() {
        let pool = test_pool().await;
        seed_presale(&pool, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        insert_batch(&mut conn, &[ticket(10, 1, 2500), ticket(11, 1, 2500)])
            .await
            .unwrap();
        let active = find_active_by_presale(&mut conn, 1).await.unwrap();
        assert_eq!(active.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_refunded_terminal() {
        let pool = test_pool().await;
        seed_presale(&pool, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        insert_batch(&mut conn, &[ticket(10, 1, 2500)]).await.unwrap();

        mark_refunded(&mut conn, 10).await.unwrap();
        let err = mark_refunded(&mut conn, 10).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::InvalidStatus, _)
        ));

        let err = mark_refunded(&mut conn, 999).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_boarding_list_excludes_refunded() {
        let pool = test_pool().await;
        seed_presale(&pool, 1).await;

        let mut conn = pool.acquire().await.unwrap();
        insert_batch(&mut conn, &[ticket(10, 1, 2500), ticket(11, 1, 2500)])
            .await
            .unwrap();
        mark_refunded(&mut conn, 11).await.unwrap();
        drop(conn);

        let uid = SlotUid::new(SlotKind::Generated, 1);
        let items = boarding_list(&pool, uid).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ticket_id, 10);
        assert_eq!(items[0].customer_name, "Jordi");
        assert_eq!(count_active_by_slot(&pool, uid).await.unwrap(), 1);
    }
}
