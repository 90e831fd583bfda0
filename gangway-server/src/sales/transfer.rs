//! Transfer Engine
//!
//! Moves a whole presale or a single ticket to another slot. Transfers
//! move seats, never money: reserve on the target, release on the
//! source, carry the payment state along unchanged. If the target lacks
//! capacity the whole operation fails with no partial state change.

use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::db::repository::{presale, slot, ticket};
use crate::utils::{AppError, AppResult, time};
use shared::DomainErrorCode;
use shared::models::{SlotUid, TicketStatus, TransferResult};

/// Transfer a presale (all its active tickets) to another slot.
pub async fn transfer_presale(
    pool: &SqlitePool,
    tz: Tz,
    presale_id: i64,
    target_uid: SlotUid,
) -> AppResult<TransferResult> {
    let mut tx = pool.begin().await?;
    let current = presale::find_operable(&mut tx, presale_id).await?;
    let source_uid = current.slot_uid();

    if target_uid == source_uid {
        return Err(AppError::validation(
            "Target slot is the presale's current slot",
        ));
    }

    let seats = ticket::find_active_by_presale(&mut tx, presale_id)
        .await?
        .into_iter()
        .filter(|t| SlotUid::new(t.slot_kind, t.slot_id) == source_uid)
        .count() as i64;
    if seats == 0 {
        return Err(AppError::validation(format!(
            "Presale {presale_id} holds no seats on its slot"
        )));
    }

    let target = slot::lookup_active(&mut tx, target_uid).await?;
    // Reserve first: a full target aborts before the source is touched
    slot::reserve(&mut tx, target_uid, seats).await?;
    slot::release(&mut tx, source_uid, seats).await?;

    let new_day = time::business_day_for(Some(&target.trip_date), tz)?;
    presale::update_slot_ref(&mut tx, presale_id, target_uid, &new_day).await?;
    ticket::update_slot_ref_by_presale(&mut tx, presale_id, source_uid, target_uid).await?;

    let mut affected = vec![current.business_day.clone()];
    if new_day != current.business_day {
        affected.push(new_day.clone());
    }

    let updated = presale::find_by_id_tx(&mut tx, presale_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {presale_id} not found")))?;
    tx.commit().await?;
    tracing::info!(
        presale_id,
        from = %source_uid,
        to = %target_uid,
        seats,
        "Presale transferred"
    );
    Ok(TransferResult {
        moved_seats: seats,
        affected_business_days: affected,
        presale: updated,
    })
}

/// Transfer a single ticket to another slot (partial transfer).
///
/// The ticket keeps its sale-time price — a seat move does not reprice
/// what the customer already bought — and the owning presale's seat
/// count and total are recomputed from its remaining active tickets.
pub async fn transfer_ticket(
    pool: &SqlitePool,
    tz: Tz,
    ticket_id: i64,
    target_uid: SlotUid,
) -> AppResult<TransferResult> {
    let mut tx = pool.begin().await?;

    let t = ticket::find_by_id_tx(&mut tx, ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;
    if t.status != TicketStatus::Active {
        return Err(AppError::domain(
            DomainErrorCode::InvalidStatus,
            format!("Ticket {ticket_id} is REFUNDED and cannot be transferred"),
        ));
    }
    let current = presale::find_operable(&mut tx, t.presale_id).await?;

    let source_uid = SlotUid::new(t.slot_kind, t.slot_id);
    if target_uid == source_uid {
        return Err(AppError::validation(
            "Target slot is the ticket's current slot",
        ));
    }

    let target = slot::lookup_active(&mut tx, target_uid).await?;
    slot::reserve(&mut tx, target_uid, 1).await?;
    slot::release(&mut tx, source_uid, 1).await?;
    ticket::update_slot_ref(&mut tx, ticket_id, target_uid, t.price).await?;

    // Recompute the presale aggregates from its tickets; a pure move
    // keeps them numerically identical.
    let active = ticket::find_active_by_presale(&mut tx, t.presale_id).await?;
    let seats = active.len() as i64;
    let total: i64 = active.iter().map(|t| t.price).sum();
    presale::update_seats_and_total(
        &mut tx,
        t.presale_id,
        seats,
        total,
        current.prepayment_amount.min(total),
    )
    .await?;

    let source_day = slot::find_tx(&mut tx, source_uid)
        .await?
        .map(|s| s.trip_date);
    let target_day = time::business_day_for(Some(&target.trip_date), tz)?;
    let mut affected = Vec::new();
    if let Some(day) = source_day {
        affected.push(day);
    }
    if !affected.contains(&target_day) {
        affected.push(target_day);
    }

    let updated = presale::find_by_id_tx(&mut tx, t.presale_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {} not found", t.presale_id)))?;
    tx.commit().await?;
    tracing::info!(
        ticket_id,
        presale_id = t.presale_id,
        from = %source_uid,
        to = %target_uid,
        "Ticket transferred"
    );
    Ok(TransferResult {
        moved_seats: 1,
        affected_business_days: affected,
        presale: updated,
    })
}
