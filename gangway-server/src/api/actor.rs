//! Actor context middleware
//!
//! Authentication/session issuance is out of scope; the upstream layer
//! identifies the caller through `X-Actor-Role` (SELLER | DISPATCHER |
//! OWNER, default SELLER) and `X-Actor-Id` (seller id) headers. The
//! middleware parses them once and injects an [`Actor`] extension for
//! every handler.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use shared::models::{Actor, ActorRole};

pub async fn actor_context(mut req: Request, next: Next) -> Response {
    let role = req
        .headers()
        .get("x-actor-role")
        .and_then(|v| v.to_str().ok())
        .and_then(ActorRole::parse)
        .unwrap_or(ActorRole::Seller);
    let seller_id = req
        .headers()
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok());

    req.extensions_mut().insert(Actor { role, seller_id });
    next.run(req).await
}
