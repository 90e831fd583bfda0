//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`slots`] - 航次舱位管理接口
//! - [`presales`] - 预售管理接口
//! - [`tickets`] - 单张船票接口
//! - [`sellers`] - 售票员管理接口
//! - [`dispatcher`] - 调度员登船名单接口
//! - [`owner`] - 船东汇总/对账接口

pub mod actor;

pub mod dispatcher;
pub mod health;
pub mod owner;
pub mod presales;
pub mod sellers;
pub mod slots;
pub mod tickets;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(slots::router())
        .merge(presales::router())
        .merge(tickets::router())
        .merge(sellers::router())
        .merge(dispatcher::router())
        .merge(owner::router())
}

/// Build the fully configured application with all middleware.
///
/// Used by both the HTTP server and in-process tests.
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - the UI layer lives elsewhere
        .layer(CorsLayer::permissive())
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Actor context from X-Actor-* headers - executes before routes
        .layer(axum_middleware::from_fn(actor::actor_context))
}
