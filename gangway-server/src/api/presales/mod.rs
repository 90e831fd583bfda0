//! Presale API 模块

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/presales", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payment", patch(handler::update_payment))
        .route("/{id}/accept-payment", patch(handler::accept_payment))
        .route("/{id}/delete", patch(handler::delete))
        .route("/{id}/transfer", post(handler::transfer))
        .route("/{id}/ledger", get(handler::ledger_entries))
}
