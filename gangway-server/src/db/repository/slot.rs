//! Slot Repository
//!
//! Source of truth for per-trip seat capacity. `reserve` / `release` are
//! guarded single-statement UPDATEs: the store serializes concurrent
//! writers, so `seats_remaining` can never go negative or exceed capacity.

use super::{RepoError, RepoResult};
use shared::DomainErrorCode;
use shared::models::{Slot, SlotCreate, SlotUid, SlotUpdate};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn create(pool: &SqlitePool, data: SlotCreate) -> RepoResult<Slot> {
    if data.capacity <= 0 {
        return Err(RepoError::Validation(format!(
            "capacity must be positive, got {}",
            data.capacity
        )));
    }
    for (field, value) in [
        ("price_adult", data.price_adult),
        ("price_teen", data.price_teen),
        ("price_child", data.price_child),
    ] {
        if value < 0 {
            return Err(RepoError::Validation(format!(
                "{field} cannot be negative: {value}"
            )));
        }
    }

    let now = shared::util::now_millis();
    let id = data.id.unwrap_or_else(shared::util::snowflake_id);

    let result = sqlx::query(
        "INSERT INTO slot (id, kind, trip_date, start_time, duration_min, boat_name, capacity, seats_remaining, price_adult, price_teen, price_child, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?9, ?10, 1, ?11, ?11)",
    )
    .bind(id)
    .bind(data.kind)
    .bind(&data.trip_date)
    .bind(&data.start_time)
    .bind(data.duration_min)
    .bind(&data.boat_name)
    .bind(data.capacity)
    .bind(data.price_adult)
    .bind(data.price_teen)
    .bind(data.price_child)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(db))
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            return Err(RepoError::Duplicate(format!(
                "Slot {} already exists",
                SlotUid::new(data.kind, id)
            )));
        }
        Err(e) => return Err(e.into()),
    }

    find(pool, SlotUid::new(data.kind, id))
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create slot".into()))
}

pub async fn find(pool: &SqlitePool, uid: SlotUid) -> RepoResult<Option<Slot>> {
    let slot = sqlx::query_as::<_, Slot>(
        "SELECT id, kind, trip_date, start_time, duration_min, boat_name, capacity, seats_remaining, price_adult, price_teen, price_child, is_active, created_at, updated_at FROM slot WHERE kind = ? AND id = ?",
    )
    .bind(uid.kind)
    .bind(uid.id)
    .fetch_optional(pool)
    .await?;
    Ok(slot)
}

/// Transaction-scoped variant of [`find`]
pub async fn find_tx(conn: &mut SqliteConnection, uid: SlotUid) -> RepoResult<Option<Slot>> {
    let slot = sqlx::query_as::<_, Slot>(
        "SELECT id, kind, trip_date, start_time, duration_min, boat_name, capacity, seats_remaining, price_adult, price_teen, price_child, is_active, created_at, updated_at FROM slot WHERE kind = ? AND id = ?",
    )
    .bind(uid.kind)
    .bind(uid.id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(slot)
}

/// Resolve a slot uid to an active slot row, or SLOT_NOT_FOUND.
pub async fn lookup_active(conn: &mut SqliteConnection, uid: SlotUid) -> RepoResult<Slot> {
    let slot = find_tx(conn, uid).await?;
    match slot {
        Some(s) if s.is_active => Ok(s),
        _ => Err(RepoError::Domain(
            DomainErrorCode::SlotNotFound,
            format!("Slot {uid} not found"),
        )),
    }
}

pub async fn find_by_date_range(
    pool: &SqlitePool,
    start_date: &str,
    end_date: &str,
) -> RepoResult<Vec<Slot>> {
    let slots = sqlx::query_as::<_, Slot>(
        "SELECT id, kind, trip_date, start_time, duration_min, boat_name, capacity, seats_remaining, price_adult, price_teen, price_child, is_active, created_at, updated_at FROM slot WHERE trip_date >= ? AND trip_date <= ? ORDER BY trip_date ASC, start_time ASC",
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(slots)
}

/// Atomically check-and-decrement remaining seats.
///
/// The guard (`seats_remaining >= ?`) is the serialization point for
/// concurrent sales of the last seats: at most one of N racing requests
/// can pass it. Must run on the same transaction as the presale/ticket
/// insert so a crash in between never strands inventory.
pub async fn reserve(conn: &mut SqliteConnection, uid: SlotUid, seats: i64) -> RepoResult<()> {
    if seats <= 0 {
        return Err(RepoError::Validation(format!(
            "seats must be positive, got {seats}"
        )));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE slot SET seats_remaining = seats_remaining - ?1, updated_at = ?2 WHERE kind = ?3 AND id = ?4 AND is_active = 1 AND seats_remaining >= ?1",
    )
    .bind(seats)
    .bind(now)
    .bind(uid.kind)
    .bind(uid.id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        // Guard failed — resolve which invariant stopped it
        let slot = find_tx(conn, uid).await?;
        let slot = match slot {
            Some(s) if s.is_active => s,
            _ => {
                return Err(RepoError::Domain(
                    DomainErrorCode::SlotNotFound,
                    format!("Slot {uid} not found"),
                ));
            }
        };
        if seats > slot.capacity {
            return Err(RepoError::Domain(
                DomainErrorCode::SeatCapacityExceeded,
                format!(
                    "Requested {seats} seats exceeds capacity {} of slot {uid}",
                    slot.capacity
                ),
            ));
        }
        return Err(RepoError::Domain(
            DomainErrorCode::NoSeats,
            format!(
                "Slot {uid} has {} seats remaining, requested {seats}",
                slot.seats_remaining
            ),
        ));
    }
    Ok(())
}

/// Return seats to a slot, clamped at capacity in SQL so a double-release
/// bug can never push `seats_remaining` past `capacity`.
pub async fn release(conn: &mut SqliteConnection, uid: SlotUid, seats: i64) -> RepoResult<()> {
    if seats <= 0 {
        return Err(RepoError::Validation(format!(
            "seats must be positive, got {seats}"
        )));
    }
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE slot SET seats_remaining = MIN(capacity, seats_remaining + ?1), updated_at = ?2 WHERE kind = ?3 AND id = ?4",
    )
    .bind(seats)
    .bind(now)
    .bind(uid.kind)
    .bind(uid.id)
    .execute(&mut *conn)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Domain(
            DomainErrorCode::SlotNotFound,
            format!("Slot {uid} not found"),
        ));
    }
    Ok(())
}

pub async fn update(pool: &SqlitePool, uid: SlotUid, data: SlotUpdate) -> RepoResult<Slot> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE slot SET start_time = COALESCE(?1, start_time), duration_min = COALESCE(?2, duration_min), boat_name = COALESCE(?3, boat_name), price_adult = COALESCE(?4, price_adult), price_teen = COALESCE(?5, price_teen), price_child = COALESCE(?6, price_child), is_active = COALESCE(?7, is_active), updated_at = ?8 WHERE kind = ?9 AND id = ?10",
    )
    .bind(&data.start_time)
    .bind(data.duration_min)
    .bind(&data.boat_name)
    .bind(data.price_adult)
    .bind(data.price_teen)
    .bind(data.price_child)
    .bind(data.is_active)
    .bind(now)
    .bind(uid.kind)
    .bind(uid.id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Slot {uid} not found")));
    }
    find(pool, uid)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Slot {uid} not found")))
}

/// Delete a slot. Refused while any non-terminal presale references it.
pub async fn delete(pool: &SqlitePool, uid: SlotUid) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let referenced: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM presale WHERE slot_kind = ? AND slot_id = ? AND status = 'ACTIVE'",
    )
    .bind(uid.kind)
    .bind(uid.id)
    .fetch_one(&mut *tx)
    .await?;

    if referenced > 0 {
        return Err(RepoError::Conflict(format!(
            "Slot {uid} is referenced by {referenced} active presale(s)"
        )));
    }

    let rows = sqlx::query("DELETE FROM slot WHERE kind = ? AND id = ?")
        .bind(uid.kind)
        .bind(uid.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use shared::models::SlotKind;

    fn slot_create(id: i64, capacity: i64) -> SlotCreate {
        SlotCreate {
            id: Some(id),
            kind: SlotKind::Generated,
            trip_date: "2025-07-01".into(),
            start_time: "10:30".into(),
            duration_min: Some(90),
            boat_name: Some("Estrella del Mar".into()),
            capacity,
            price_adult: 2500,
            price_teen: 1800,
            price_child: 1200,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let slot = create(&pool, slot_create(1, 12)).await.unwrap();
        assert_eq!(slot.seats_remaining, 12);
        assert_eq!(slot.capacity, 12);
        assert!(slot.is_active);

        let uid = SlotUid::new(SlotKind::Generated, 1);
        assert!(find(&pool, uid).await.unwrap().is_some());
        // Same numeric id under the other kind is a different slot
        assert!(
            find(&pool, SlotUid::new(SlotKind::Manual, 1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_rejected() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 12)).await.unwrap();
        let err = create(&pool, slot_create(1, 12)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_reserve_decrements() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 10)).await.unwrap();
        let uid = SlotUid::new(SlotKind::Generated, 1);

        let mut conn = pool.acquire().await.unwrap();
        reserve(&mut conn, uid, 4).await.unwrap();
        drop(conn);

        let slot = find(&pool, uid).await.unwrap().unwrap();
        assert_eq!(slot.seats_remaining, 6);
    }

    #[tokio::test]
    async fn test_reserve_no_seats() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 3)).await.unwrap();
        let uid = SlotUid::new(SlotKind::Generated, 1);

        let mut conn = pool.acquire().await.unwrap();
        reserve(&mut conn, uid, 2).await.unwrap();
        let err = reserve(&mut conn, uid, 2).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::NoSeats, _)
        ));

        drop(conn);
        let slot = find(&pool, uid).await.unwrap().unwrap();
        assert_eq!(slot.seats_remaining, 1);
    }

    #[tokio::test]
    async fn test_reserve_capacity_exceeded() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 3)).await.unwrap();
        let uid = SlotUid::new(SlotKind::Generated, 1);

        let mut conn = pool.acquire().await.unwrap();
        let err = reserve(&mut conn, uid, 5).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::SeatCapacityExceeded, _)
        ));
    }

    #[tokio::test]
    async fn test_reserve_unknown_or_inactive_slot() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 3)).await.unwrap();
        let uid = SlotUid::new(SlotKind::Generated, 1);

        let mut conn = pool.acquire().await.unwrap();
        let err = reserve(&mut conn, SlotUid::new(SlotKind::Manual, 99), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::SlotNotFound, _)
        ));
        drop(conn);

        update(
            &pool,
            uid,
            SlotUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let err = reserve(&mut conn, uid, 1).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Domain(DomainErrorCode::SlotNotFound, _)
        ));
    }

    #[tokio::test]
    async fn test_release_clamped_at_capacity() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 5)).await.unwrap();
        let uid = SlotUid::new(SlotKind::Generated, 1);

        let mut conn = pool.acquire().await.unwrap();
        reserve(&mut conn, uid, 2).await.unwrap();
        // Double-release: 3 + 2 + 2 would exceed capacity, clamp to 5
        release(&mut conn, uid, 2).await.unwrap();
        release(&mut conn, uid, 2).await.unwrap();
        drop(conn);

        let slot = find(&pool, uid).await.unwrap().unwrap();
        assert_eq!(slot.seats_remaining, 5);
    }

    #[tokio::test]
    async fn test_delete_refused_while_referenced() {
        let pool = test_pool().await;
        create(&pool, slot_create(1, 5)).await.unwrap();
        let uid = SlotUid::new(SlotKind::Generated, 1);

        sqlx::query(
            "INSERT INTO presale (id, slot_kind, slot_id, customer_name, customer_phone, number_of_seats, total_price, business_day, created_at, updated_at) VALUES (7, 'GENERATED', 1, 'Ana', '600111222', 2, 5000, '2025-07-01', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = delete(&pool, uid).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));

        // Terminal presales no longer block deletion
        sqlx::query("UPDATE presale SET status = 'CANCELLED' WHERE id = 7")
            .execute(&pool)
            .await
            .unwrap();
        assert!(delete(&pool, uid).await.unwrap());
    }
}
