//! Ticket API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::core::ServerState;
use crate::db::repository::ticket;
use crate::sales;
use crate::utils::{AppError, AppResult};
use shared::models::{
    Actor, PresaleCancel, Ticket, TicketDeleteResult, TransferRequest, TransferResult,
};

/// GET /api/tickets/:id - 单张船票
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let t = ticket::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {} not found", id)))?;
    Ok(Json(t))
}

/// PATCH /api/tickets/:id/delete - 退一个座位
///
/// 当剩余总价低于已收款时 (含最后一张票的情况)，必须携带
/// REFUND/FUND 决定。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<PresaleCancel>,
) -> AppResult<Json<TicketDeleteResult>> {
    let result = sales::delete_ticket(&state.pool, &actor, id, payload.decision).await?;
    Ok(Json(result))
}

/// POST /api/tickets/:id/transfer - 单座转移到另一航次
pub async fn transfer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransferRequest>,
) -> AppResult<Json<TransferResult>> {
    let result = sales::transfer_ticket(
        &state.pool,
        state.config.timezone,
        id,
        payload.target_slot_uid,
    )
    .await?;
    Ok(Json(result))
}
