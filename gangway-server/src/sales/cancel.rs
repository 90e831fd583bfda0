//! Cancellation Engine
//!
//! Full presale cancellation and single-ticket deletion. Reversed money
//! always goes through an explicit REFUND/FUND decision — the engine
//! never routes customer money on its own.

use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{canonical, ledger, presale, slot, ticket};
use crate::utils::{AppError, AppResult};
use shared::DomainErrorCode;
use shared::models::{
    Actor, LedgerEntryType, NewLedgerEntry, PaymentMethod, Presale, RefundDecision, SlotUid,
    TicketDeleteResult, TicketStatus,
};

/// Append the reversal ledger row for `amount`, split the way the money
/// actually came in (cash first, then card, per the presale's net
/// collected split).
async fn append_reversal(
    conn: &mut SqliteConnection,
    current: &Presale,
    actor: &Actor,
    amount: i64,
    route: RefundDecision,
) -> AppResult<()> {
    let (net_cash, _net_card) = ledger::net_split_by_presale(conn, current.id).await?;
    let cash_amount = amount.min(net_cash.max(0));
    let card_amount = amount - cash_amount;
    let method = current.payment_method.unwrap_or(PaymentMethod::Cash);

    ledger::append(
        conn,
        NewLedgerEntry {
            presale_id: Some(current.id),
            seller_id: current.seller_id,
            business_day: current.business_day.clone(),
            kind: actor.ledger_kind(),
            entry_type: LedgerEntryType::SaleCancelReverse,
            amount,
            cash_amount,
            card_amount,
            method,
            route: Some(route),
        },
    )
    .await?;
    Ok(())
}

/// Cancel a presale: refund all active tickets, release their seats, and
/// route any collected prepayment per the caller's decision.
pub async fn cancel_presale(
    pool: &SqlitePool,
    actor: &Actor,
    presale_id: i64,
    decision: Option<RefundDecision>,
) -> AppResult<Presale> {
    let mut tx = pool.begin().await?;
    let current = presale::find_operable(&mut tx, presale_id).await?;

    let prepaid = current.prepayment_amount;
    let decision = match (prepaid > 0, decision) {
        (true, None) => {
            return Err(AppError::domain(
                DomainErrorCode::RefundDecisionRequired,
                format!(
                    "Presale {presale_id} carries {prepaid} of unrefunded prepayment; a REFUND or FUND decision is required"
                ),
            ));
        }
        (true, Some(d)) => Some(d),
        (false, _) => None,
    };

    // Seats still held = active tickets; individually refunded tickets
    // already gave their seat back. Released per ticket slot — partial
    // transfers may have spread the tickets over several slots.
    let active = ticket::find_active_by_presale(&mut tx, presale_id).await?;
    let mut seats_by_slot: std::collections::BTreeMap<SlotUid, i64> =
        std::collections::BTreeMap::new();
    for t in &active {
        *seats_by_slot
            .entry(SlotUid::new(t.slot_kind, t.slot_id))
            .or_insert(0) += 1;
    }
    let refunded = ticket::mark_refunded_by_presale(&mut tx, presale_id).await?;
    for (uid, seats) in seats_by_slot {
        slot::release(&mut tx, uid, seats).await?;
    }
    presale::mark_cancelled(&mut tx, presale_id).await?;

    if let Some(route) = decision {
        append_reversal(&mut tx, &current, actor, prepaid, route).await?;
        match route {
            RefundDecision::Refund => {
                canonical::void_by_presale(&mut tx, presale_id).await?;
            }
            RefundDecision::Fund => {
                canonical::tag_fund_by_presale(&mut tx, presale_id).await?;
            }
        }
    }

    let updated = presale::find_by_id_tx(&mut tx, presale_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {presale_id} not found")))?;
    tx.commit().await?;
    tracing::info!(
        presale_id,
        seats_released = refunded,
        reversed = prepaid,
        decision = ?decision,
        "Presale cancelled"
    );
    Ok(updated)
}

/// Delete (refund) one ticket: release its seat and recompute the owning
/// presale from the remaining active tickets.
///
/// Whenever the recomputed total would fall below the collected
/// prepayment — always the case for the last ticket of a prepaid presale
/// — the overhang must be routed by an explicit decision. Deleting the
/// last active ticket completes as a full cancellation.
pub async fn delete_ticket(
    pool: &SqlitePool,
    actor: &Actor,
    ticket_id: i64,
    decision: Option<RefundDecision>,
) -> AppResult<TicketDeleteResult> {
    let mut tx = pool.begin().await?;

    let t = ticket::find_by_id_tx(&mut tx, ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;
    if t.status != TicketStatus::Active {
        return Err(AppError::domain(
            DomainErrorCode::InvalidStatus,
            format!("Ticket {ticket_id} is already REFUNDED"),
        ));
    }
    let current = presale::find_operable(&mut tx, t.presale_id).await?;

    let remaining: Vec<_> = ticket::find_active_by_presale(&mut tx, t.presale_id)
        .await?
        .into_iter()
        .filter(|other| other.id != ticket_id)
        .collect();
    let new_seats = remaining.len() as i64;
    let new_total: i64 = remaining.iter().map(|t| t.price).sum();
    let overhang = current.prepayment_amount - new_total;

    if overhang > 0 && decision.is_none() {
        return Err(AppError::domain(
            DomainErrorCode::RefundDecisionRequired,
            format!(
                "Deleting ticket {ticket_id} leaves {overhang} of prepayment above the new total; a REFUND or FUND decision is required"
            ),
        ));
    }

    ticket::mark_refunded(&mut tx, ticket_id).await?;
    // Release on the ticket's own slot — it may have been transferred
    // away from the presale's slot.
    slot::release(&mut tx, SlotUid::new(t.slot_kind, t.slot_id), 1).await?;

    let last_ticket = new_seats == 0;
    let new_prepayment = current.prepayment_amount.min(new_total);
    presale::update_seats_and_total(&mut tx, t.presale_id, new_seats, new_total, new_prepayment)
        .await?;

    if overhang > 0 {
        // Decision is guaranteed present here
        let route = decision.unwrap_or(RefundDecision::Refund);
        append_reversal(&mut tx, &current, actor, overhang, route).await?;
        match (route, last_ticket) {
            (RefundDecision::Refund, true) => {
                canonical::void_by_presale(&mut tx, t.presale_id).await?;
            }
            (RefundDecision::Refund, false) => {
                let method = current.payment_method.unwrap_or(PaymentMethod::Cash);
                canonical::append(
                    &mut tx,
                    t.presale_id,
                    -overhang,
                    &current.business_day,
                    method,
                )
                .await?;
            }
            (RefundDecision::Fund, true) => {
                canonical::tag_fund_by_presale(&mut tx, t.presale_id).await?;
            }
            (RefundDecision::Fund, false) => {}
        }
    }

    if last_ticket {
        presale::mark_cancelled(&mut tx, t.presale_id).await?;
    }

    let updated = presale::find_by_id_tx(&mut tx, t.presale_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {} not found", t.presale_id)))?;
    tx.commit().await?;
    tracing::info!(
        ticket_id,
        presale_id = t.presale_id,
        presale_cancelled = last_ticket,
        "Ticket deleted"
    );
    Ok(TicketDeleteResult {
        ticket_id,
        presale: updated,
        presale_cancelled: last_ticket,
    })
}
