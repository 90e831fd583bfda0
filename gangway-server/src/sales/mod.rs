//! Sales Engine
//!
//! Orchestrates the seat inventory, presale/ticket lifecycle, payment
//! ledger and canonical projection. Every compound operation runs inside
//! one database transaction: inventory and financial state change
//! atomically or not at all — a crash between the seat reservation and
//! the ledger write cannot leave either side dangling.

pub mod cancel;
pub mod transfer;


pub use cancel::{cancel_presale, delete_ticket};
pub use transfer::{transfer_presale, transfer_ticket};

use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::db::repository::{canonical, ledger, presale, seller, slot, ticket};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_amount, validate_positive_amount,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, time};
use shared::DomainErrorCode;
use shared::models::{
    Actor, LedgerEntryType, NewLedgerEntry, PaymentAccept, PaymentMethod, PaymentUpdate, Presale,
    PresaleCreate, PresaleStatus, SeatCategory, Ticket, TicketStatus,
};

/// Resolve a MIXED split: both parts present, non-negative, summing to
/// `expected`. CASH/CARD attribute the whole amount to that method.
fn resolve_split(
    method: PaymentMethod,
    cash: Option<i64>,
    card: Option<i64>,
    expected: i64,
) -> AppResult<(i64, i64)> {
    match method {
        PaymentMethod::Cash => Ok((expected, 0)),
        PaymentMethod::Card => Ok((0, expected)),
        PaymentMethod::Mixed => {
            let (cash, card) = match (cash, card) {
                (Some(cash), Some(card)) if cash >= 0 && card >= 0 => (cash, card),
                _ => {
                    return Err(AppError::validation(
                        "MIXED payment requires non-negative cash_amount and card_amount",
                    ));
                }
            };
            if cash + card != expected {
                return Err(AppError::domain(
                    DomainErrorCode::MixedSplitMismatch,
                    format!("Split {cash} + {card} does not match expected {expected}"),
                ));
            }
            Ok((cash, card))
        }
    }
}

/// Create a presale with its tickets, reserving seats and recording the
/// initial prepayment — one atomic unit.
pub async fn create_presale(
    pool: &SqlitePool,
    tz: Tz,
    actor: &Actor,
    data: PresaleCreate,
) -> AppResult<Presale> {
    validate_required_text(&data.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_required_text(&data.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
    validate_amount(data.prepayment_amount, "prepayment_amount")?;

    let breakdown = data.breakdown;
    for (field, count) in [
        ("adult", breakdown.adult),
        ("teen", breakdown.teen),
        ("child", breakdown.child),
    ] {
        if count < 0 {
            return Err(AppError::validation(format!(
                "{field} seat count must be non-negative, got {count}"
            )));
        }
    }
    let seats = breakdown.seats();
    if seats <= 0 {
        return Err(AppError::validation("At least one seat is required"));
    }

    let mut tx = pool.begin().await?;

    // Explicit seller id must resolve; omitted id defaults to the acting seller
    let seller_id = match data.seller_id {
        Some(id) => {
            if !seller::exists(&mut tx, id).await? {
                return Err(AppError::domain(
                    DomainErrorCode::SellerNotFound,
                    format!("Seller {id} not found"),
                ));
            }
            Some(id)
        }
        None => actor.seller_id,
    };

    let slot = slot::lookup_active(&mut tx, data.slot_uid).await?;
    let total_price = breakdown.adult * slot.price_adult
        + breakdown.teen * slot.price_teen
        + breakdown.child * slot.price_child;

    if data.prepayment_amount > total_price {
        return Err(AppError::domain(
            DomainErrorCode::PrepaymentExceedsTotal,
            format!(
                "Prepayment {} exceeds total price {total_price}",
                data.prepayment_amount
            ),
        ));
    }

    let (method, cash_amount, card_amount) = if data.prepayment_amount > 0 {
        let method = data.payment_method.ok_or_else(|| {
            AppError::validation("payment_method is required when prepayment_amount > 0")
        })?;
        let (cash, card) = resolve_split(
            method,
            data.cash_amount,
            data.card_amount,
            data.prepayment_amount,
        )?;
        (Some(method), cash, card)
    } else {
        (None, 0, 0)
    };

    // Seat reservation is the serialization point; everything after it
    // rolls back with the transaction on failure.
    slot::reserve(&mut tx, data.slot_uid, seats).await?;

    let business_day = time::business_day_for(Some(&slot.trip_date), tz)?;
    let now = shared::util::now_millis();
    let row = Presale {
        id: shared::util::snowflake_id(),
        slot_kind: slot.kind,
        slot_id: slot.id,
        customer_name: data.customer_name.trim().to_string(),
        customer_phone: data.customer_phone.trim().to_string(),
        number_of_seats: seats,
        total_price,
        prepayment_amount: data.prepayment_amount,
        payment_method: method,
        payment_cash_amount: cash_amount,
        payment_card_amount: card_amount,
        status: PresaleStatus::Active,
        seller_id,
        business_day: business_day.clone(),
        note: data.note.clone(),
        created_at: now,
        updated_at: now,
    };
    presale::insert(&mut tx, &row).await?;

    let mut tickets = Vec::with_capacity(seats as usize);
    for (category, count) in [
        (SeatCategory::Adult, breakdown.adult),
        (SeatCategory::Teen, breakdown.teen),
        (SeatCategory::Child, breakdown.child),
    ] {
        for _ in 0..count {
            tickets.push(Ticket {
                id: shared::util::snowflake_id(),
                presale_id: row.id,
                slot_kind: slot.kind,
                slot_id: slot.id,
                code: shared::util::ticket_code(),
                category,
                price: slot.price_for(category),
                status: TicketStatus::Active,
                created_at: now,
                updated_at: now,
            });
        }
    }
    ticket::insert_batch(&mut tx, &tickets).await?;

    if data.prepayment_amount > 0 {
        let method = method.unwrap_or(PaymentMethod::Cash);
        ledger::append(
            &mut tx,
            NewLedgerEntry {
                presale_id: Some(row.id),
                seller_id,
                business_day: business_day.clone(),
                kind: actor.ledger_kind(),
                entry_type: LedgerEntryType::prepayment(method),
                amount: data.prepayment_amount,
                cash_amount,
                card_amount,
                method,
                route: None,
            },
        )
        .await?;
        canonical::append(
            &mut tx,
            row.id,
            data.prepayment_amount,
            &business_day,
            method,
        )
        .await?;
    }

    tx.commit().await?;
    tracing::info!(
        presale_id = row.id,
        slot = %data.slot_uid,
        seats,
        total_price,
        prepayment = data.prepayment_amount,
        "Presale created"
    );
    Ok(row)
}

/// Partial top-up: collect exactly `amount` more, never past the total.
pub async fn update_payment(
    pool: &SqlitePool,
    actor: &Actor,
    presale_id: i64,
    data: PaymentUpdate,
) -> AppResult<Presale> {
    validate_positive_amount(data.amount, "amount")?;
    if data.method == PaymentMethod::Mixed {
        return Err(AppError::validation(
            "Top-ups are single-method; use CASH or CARD",
        ));
    }

    let mut tx = pool.begin().await?;
    let current = presale::find_operable(&mut tx, presale_id).await?;

    // Bound check is repeated inside the guarded UPDATE — this read is
    // only for the business day and seller reference.
    presale::add_prepayment(&mut tx, presale_id, data.amount).await?;

    let (cash_amount, card_amount) = resolve_split(data.method, None, None, data.amount)?;
    ledger::append(
        &mut tx,
        NewLedgerEntry {
            presale_id: Some(presale_id),
            seller_id: current.seller_id,
            business_day: current.business_day.clone(),
            kind: actor.ledger_kind(),
            // The incremental amount only — never the cumulative total
            entry_type: LedgerEntryType::prepayment(data.method),
            amount: data.amount,
            cash_amount,
            card_amount,
            method: data.method,
            route: None,
        },
    )
    .await?;
    canonical::append(
        &mut tx,
        presale_id,
        data.amount,
        &current.business_day,
        data.method,
    )
    .await?;

    let updated = presale::find_by_id_tx(&mut tx, presale_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {presale_id} not found")))?;
    tx.commit().await?;
    Ok(updated)
}

/// Complete payment to exactly the outstanding remainder.
pub async fn accept_payment(
    pool: &SqlitePool,
    actor: &Actor,
    presale_id: i64,
    data: PaymentAccept,
) -> AppResult<Presale> {
    let mut tx = pool.begin().await?;
    let current = presale::find_operable(&mut tx, presale_id).await?;

    let remaining = current.remaining();
    if remaining <= 0 {
        return Err(AppError::domain(
            DomainErrorCode::NothingOutstanding,
            format!("Presale {presale_id} is already fully paid"),
        ));
    }

    let (cash_amount, card_amount) =
        resolve_split(data.method, data.cash_amount, data.card_amount, remaining)?;

    presale::accept_payment(
        &mut tx,
        presale_id,
        data.method,
        cash_amount,
        card_amount,
        remaining,
    )
    .await?;

    ledger::append(
        &mut tx,
        NewLedgerEntry {
            presale_id: Some(presale_id),
            seller_id: current.seller_id,
            business_day: current.business_day.clone(),
            kind: actor.ledger_kind(),
            entry_type: LedgerEntryType::accepted(data.method),
            amount: remaining,
            cash_amount,
            card_amount,
            method: data.method,
            route: None,
        },
    )
    .await?;
    canonical::append(
        &mut tx,
        presale_id,
        remaining,
        &current.business_day,
        data.method,
    )
    .await?;

    let updated = presale::find_by_id_tx(&mut tx, presale_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {presale_id} not found")))?;
    tx.commit().await?;
    tracing::info!(presale_id, amount = remaining, "Payment accepted");
    Ok(updated)
}
