//! Slot API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::slot;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, time};
use shared::models::{Slot, SlotCreate, SlotKind, SlotUid, SlotUpdate};

fn parse_uid(kind: &str, id: i64) -> AppResult<SlotUid> {
    let kind = SlotKind::parse(kind)
        .ok_or_else(|| AppError::validation(format!("Invalid slot kind: {kind}")))?;
    Ok(SlotUid::new(kind, id))
}

/// Query params for listing slots
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Single trip date (YYYY-MM-DD); shorthand for from == to
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/slots - 航次列表 (按出航日期)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Slot>>> {
    let (from, to) = match (query.date, query.from, query.to) {
        (Some(date), _, _) => (date.clone(), date),
        (None, Some(from), Some(to)) => (from, to),
        _ => return Err(AppError::validation("Provide date or from/to")),
    };
    time::parse_date(&from)?;
    time::parse_date(&to)?;

    let slots = slot::find_by_date_range(&state.pool, &from, &to).await?;
    Ok(Json(slots))
}

/// GET /api/slots/:kind/:id - 单个航次
pub async fn get_by_uid(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<Slot>> {
    let uid = parse_uid(&kind, id)?;
    let s = slot::find(&state.pool, uid)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Slot {uid} not found")))?;
    Ok(Json(s))
}

/// POST /api/slots - 创建航次 (人工航次或排班生成器喂入)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SlotCreate>,
) -> AppResult<(StatusCode, Json<Slot>)> {
    time::parse_date(&payload.trip_date)?;
    validate_required_text(&payload.start_time, "start_time", MAX_SHORT_TEXT_LEN)?;

    let s = slot::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(s)))
}

/// PATCH /api/slots/:kind/:id - 更新航次 (停售/价格/时间)
pub async fn update(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i64)>,
    Json(payload): Json<SlotUpdate>,
) -> AppResult<Json<Slot>> {
    let uid = parse_uid(&kind, id)?;
    let s = slot::update(&state.pool, uid, payload).await?;
    Ok(Json(s))
}

/// DELETE /api/slots/:kind/:id - 删除航次
///
/// 仍被未终态预售引用时拒绝 (409)。
pub async fn delete_slot(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<bool>> {
    let uid = parse_uid(&kind, id)?;
    let deleted = slot::delete(&state.pool, uid).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Slot {uid} not found")));
    }
    Ok(Json(true))
}
