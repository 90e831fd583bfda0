//! Slot API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/slots", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{kind}/{id}",
            get(handler::get_by_uid)
                .patch(handler::update)
                .delete(handler::delete_slot),
        )
}
