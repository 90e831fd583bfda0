//! Seller API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::repository::seller;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Seller, SellerCreate, SellerUpdate};

/// GET /api/sellers - 售票员列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Seller>>> {
    let sellers = seller::find_all(&state.pool).await?;
    Ok(Json(sellers))
}

/// GET /api/sellers/:id - 单个售票员
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Seller>> {
    let s = seller::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Seller {} not found", id)))?;
    Ok(Json(s))
}

/// POST /api/sellers - 新增售票员
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<SellerCreate>,
) -> AppResult<(StatusCode, Json<Seller>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let s = seller::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(s)))
}

/// PATCH /api/sellers/:id - 更新售票员
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SellerUpdate>,
) -> AppResult<Json<Seller>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let s = seller::update(&state.pool, id, payload).await?;
    Ok(Json(s))
}

/// PATCH /api/sellers/:id/deactivate - 停用售票员
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Seller>> {
    let s = seller::update(
        &state.pool,
        id,
        SellerUpdate {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await?;
    Ok(Json(s))
}
