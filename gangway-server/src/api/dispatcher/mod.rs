//! Dispatcher API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/dispatcher", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/slots/{kind}/{id}/tickets", get(handler::boarding_list))
}
