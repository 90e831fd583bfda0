//! Owner API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/owner", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/money/summary", get(handler::money_summary))
        .route("/money/days", get(handler::money_days))
        .route("/money/boats", get(handler::money_boats))
        .route("/money/sellers", get(handler::money_sellers))
        .route("/occupancy", get(handler::occupancy))
        .route("/reconciliation", get(handler::reconciliation))
        .route(
            "/overrides",
            get(handler::list_overrides).post(handler::upsert_override),
        )
        .route("/overrides/{day}/lock", post(handler::lock_override))
}
