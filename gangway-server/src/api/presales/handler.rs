//! Presale API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::{ledger, presale};
use crate::sales;
use crate::utils::{AppError, AppResult};
use shared::models::{
    Actor, LedgerEntry, PaymentAccept, PaymentUpdate, Presale, PresaleCancel, PresaleCreate,
    SlotUid, TransferRequest, TransferResult,
};

/// Query params for listing presales
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Composite slot uid, e.g. `generated:123`
    pub slot_uid: Option<String>,
    /// Business day (YYYY-MM-DD)
    pub business_day: Option<String>,
}

/// GET /api/presales - 预售列表 (按航次或营业日)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Presale>>> {
    let presales = if let Some(uid) = query.slot_uid {
        let uid: SlotUid = uid.parse().map_err(AppError::validation)?;
        presale::find_by_slot(&state.pool, uid).await?
    } else if let Some(day) = query.business_day {
        crate::utils::time::parse_date(&day)?;
        presale::find_by_business_day(&state.pool, &day).await?
    } else {
        return Err(AppError::validation(
            "Provide slot_uid or business_day to list presales",
        ));
    };
    Ok(Json(presales))
}

/// GET /api/presales/:id - 单个预售
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Presale>> {
    let p = presale::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {} not found", id)))?;
    Ok(Json(p))
}

/// POST /api/presales - 创建预售 (订座 + 出票 + 可选预收款)
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<PresaleCreate>,
) -> AppResult<(StatusCode, Json<Presale>)> {
    let p = sales::create_presale(&state.pool, state.config.timezone, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(p)))
}

/// PATCH /api/presales/:id/payment - 部分补款
pub async fn update_payment(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentUpdate>,
) -> AppResult<Json<Presale>> {
    let p = sales::update_payment(&state.pool, &actor, id, payload).await?;
    Ok(Json(p))
}

/// PATCH /api/presales/:id/accept-payment - 收齐尾款
pub async fn accept_payment(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentAccept>,
) -> AppResult<Json<Presale>> {
    let p = sales::accept_payment(&state.pool, &actor, id, payload).await?;
    Ok(Json(p))
}

/// PATCH /api/presales/:id/delete - 取消预售
///
/// 预收款未退时必须携带 REFUND/FUND 决定。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<PresaleCancel>,
) -> AppResult<Json<Presale>> {
    let p = sales::cancel_presale(&state.pool, &actor, id, payload.decision).await?;
    Ok(Json(p))
}

/// POST /api/presales/:id/transfer - 整单转移到另一航次
pub async fn transfer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TransferRequest>,
) -> AppResult<Json<TransferResult>> {
    let result = sales::transfer_presale(
        &state.pool,
        state.config.timezone,
        id,
        payload.target_slot_uid,
    )
    .await?;
    Ok(Json(result))
}

/// GET /api/presales/:id/ledger - 预售的流水账
pub async fn ledger_entries(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    presale::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Presale {} not found", id)))?;
    let entries = ledger::find_by_presale(&state.pool, id).await?;
    Ok(Json(entries))
}
