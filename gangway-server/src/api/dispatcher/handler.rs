//! Dispatcher API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::{slot, ticket};
use crate::utils::{AppError, AppResult};
use shared::models::{BoardingItem, SlotKind, SlotUid};

/// GET /api/dispatcher/slots/:kind/:id/tickets - 登船名单
///
/// 只含 ACTIVE 船票 (已退票不上名单)。
pub async fn boarding_list(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<Vec<BoardingItem>>> {
    let kind = SlotKind::parse(&kind)
        .ok_or_else(|| AppError::validation(format!("Invalid slot kind: {kind}")))?;
    let uid = SlotUid::new(kind, id);

    slot::find(&state.pool, uid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Slot {uid} not found")))?;

    let items = ticket::boarding_list(&state.pool, uid).await?;
    Ok(Json(items))
}
