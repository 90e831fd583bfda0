//! Owner API Handlers
//!
//! Read side: money summaries, occupancy, daily reconciliation, and the
//! manual day-override records.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::repository::day_override;
use crate::reports;
use crate::reports::money::{BoatSummary, SellerSummary};
use crate::utils::{AppError, AppResult, time};
use shared::models::{DayOverride, DayOverrideUpsert};

/// Query params for period selection: either a preset or explicit from/to
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// today | yesterday | last7 | month
    pub preset: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl PeriodQuery {
    fn resolve(self, state: &ServerState) -> AppResult<(String, String)> {
        match (self.preset, self.from, self.to) {
            (Some(preset), _, _) => time::preset_range(&preset, state.config.timezone),
            (None, Some(from), Some(to)) => {
                time::parse_date(&from)?;
                time::parse_date(&to)?;
                Ok((from, to))
            }
            _ => Err(AppError::validation("Provide preset or from/to")),
        }
    }
}

/// GET /api/owner/money/summary - 区间汇总 {revenue, cash, card, …}
pub async fn money_summary(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<reports::MoneySummary>> {
    let (from, to) = query.resolve(&state)?;
    let summary = reports::summary(&state.pool, &from, &to).await?;
    Ok(Json(summary))
}

/// GET /api/owner/money/days - 按营业日
pub async fn money_days(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<reports::DaySummary>>> {
    let (from, to) = query.resolve(&state)?;
    let days = reports::day_breakdown(&state.pool, &from, &to).await?;
    Ok(Json(days))
}

/// GET /api/owner/money/boats - 按船
pub async fn money_boats(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<BoatSummary>>> {
    let (from, to) = query.resolve(&state)?;
    let boats = reports::boat_breakdown(&state.pool, &from, &to).await?;
    Ok(Json(boats))
}

/// GET /api/owner/money/sellers - 按售票员
pub async fn money_sellers(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<SellerSummary>>> {
    let (from, to) = query.resolve(&state)?;
    let sellers = reports::seller_breakdown(&state.pool, &from, &to).await?;
    Ok(Json(sellers))
}

/// GET /api/owner/occupancy - 上座率
pub async fn occupancy(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<reports::OccupancyItem>>> {
    let (from, to) = query.resolve(&state)?;
    let items = reports::occupancy(&state.pool, &from, &to).await?;
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: String,
}

/// GET /api/owner/reconciliation?day= - 三方对账
pub async fn reconciliation(
    State(state): State<ServerState>,
    Query(query): Query<DayQuery>,
) -> AppResult<Json<reports::Reconciliation>> {
    time::parse_date(&query.day)?;
    let r = reports::reconciliation(&state.pool, &query.day).await?;
    Ok(Json(r))
}

/// GET /api/owner/overrides - 人工日记录列表
pub async fn list_overrides(
    State(state): State<ServerState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<Vec<DayOverride>>> {
    let (from, to) = query.resolve(&state)?;
    let rows = day_override::find_range(&state.pool, &from, &to).await?;
    Ok(Json(rows))
}

/// POST /api/owner/overrides - 创建/修正人工日记录 (锁定后拒绝)
pub async fn upsert_override(
    State(state): State<ServerState>,
    Json(payload): Json<DayOverrideUpsert>,
) -> AppResult<(StatusCode, Json<DayOverride>)> {
    time::validate_not_future(
        time::parse_date(&payload.business_day)?,
        state.config.timezone,
    )?;
    let row = day_override::upsert(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/owner/overrides/:day/lock - 锁定 (此后人工记录完全取代计算值)
pub async fn lock_override(
    State(state): State<ServerState>,
    Path(day): Path<String>,
) -> AppResult<Json<DayOverride>> {
    time::parse_date(&day)?;
    let row = day_override::lock(&state.pool, &day).await?;
    Ok(Json(row))
}
