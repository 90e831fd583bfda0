//! HTTP surface test: drives the full booking flow through the router
//! the way the UI layer does, in process.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::util::ServiceExt;

use gangway_server::api;
use gangway_server::core::{Config, ServerState};
use gangway_server::db::MIGRATOR;

async fn test_app() -> Router {
    // Single connection: each `sqlite::memory:` connection is its own DB
    let pool: SqlitePool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    let config = Config::with_overrides("/tmp/gangway-test", 0);
    let state = ServerState::new(config, pool);
    api::build_app().with_state(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn slot_payload() -> Value {
    json!({
        "id": 1,
        "kind": "GENERATED",
        "trip_date": "2025-07-01",
        "start_time": "10:30",
        "duration_min": 90,
        "boat_name": "Gaviota",
        "capacity": 2,
        "price_adult": 2500,
        "price_teen": 1800,
        "price_child": 1200
    })
}

fn presale_payload(prepayment: i64) -> Value {
    json!({
        "slot_uid": "generated:1",
        "customer_name": "Ana García",
        "customer_phone": "600111222",
        "breakdown": {"adult": 1},
        "prepayment_amount": prepayment,
        "payment_method": if prepayment > 0 { Value::from("CASH") } else { Value::Null }
    })
}

#[tokio::test]
async fn test_booking_flow_end_to_end() {
    let app = test_app().await;

    let (status, _) = send(&app, "POST", "/api/slots", Some(slot_payload())).await;
    assert_eq!(status, StatusCode::CREATED);

    // Two seats, two bookings
    let (status, first) = send(&app, "POST", "/api/presales", Some(presale_payload(500))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["total_price"], 2500);
    assert_eq!(first["business_day"], "2025-07-01");

    let (status, _) = send(&app, "POST", "/api/presales", Some(presale_payload(0))).await;
    assert_eq!(status, StatusCode::CREATED);

    // Third booking: sold out
    let (status, err) = send(&app, "POST", "/api/presales", Some(presale_payload(0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "NO_SEATS");

    let (status, slot) = send(&app, "GET", "/api/slots/generated/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slot["seats_remaining"], 0);

    // Accept the remainder in cash
    let id = first["id"].as_i64().unwrap();
    let (status, paid) = send(
        &app,
        "PATCH",
        &format!("/api/presales/{id}/accept-payment"),
        Some(json!({"method": "CASH"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["prepayment_amount"], 2500);
    assert_eq!(paid["payment_cash_amount"], 2000);

    // Boarding list shows both active seats
    let (status, list) = send(&app, "GET", "/api/dispatcher/slots/generated/1/tickets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);

    // Owner's day figures
    let (status, summary) = send(
        &app,
        "GET",
        "/api/owner/money/summary?from=2025-07-01&to=2025-07-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["revenue"], 2500);
    assert_eq!(summary["cash"], 2500);
    assert_eq!(summary["card"], 0);
}

#[tokio::test]
async fn test_cancel_needs_decision_over_http() {
    let app = test_app().await;
    send(&app, "POST", "/api/slots", Some(slot_payload())).await;

    let (_, p) = send(&app, "POST", "/api/presales", Some(presale_payload(500))).await;
    let id = p["id"].as_i64().unwrap();

    let (status, err) = send(
        &app,
        "PATCH",
        &format!("/api/presales/{id}/delete"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "REFUND_DECISION_REQUIRED");

    let (status, cancelled) = send(
        &app,
        "PATCH",
        &format!("/api/presales/{id}/delete"),
        Some(json!({"decision": "REFUND"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    // Seats are back, money reversed
    let (_, slot) = send(&app, "GET", "/api/slots/generated/1", None).await;
    assert_eq!(slot["seats_remaining"], 2);
    let (_, summary) = send(
        &app,
        "GET",
        "/api/owner/money/summary?from=2025-07-01&to=2025-07-01",
        None,
    )
    .await;
    assert_eq!(summary["revenue"], 0);
    assert_eq!(summary["refunded"], 500);

    // Reconciliation holds after the reversal
    let (status, rec) = send(
        &app,
        "GET",
        "/api/owner/reconciliation?day=2025-07-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rec["consistent"], true);
}

#[tokio::test]
async fn test_not_found_and_validation_statuses() {
    let app = test_app().await;

    let (status, err) = send(&app, "GET", "/api/presales/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", "/api/tickets/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unknown slot in a booking → 404 SLOT_NOT_FOUND
    send(&app, "POST", "/api/slots", Some(slot_payload())).await;
    let mut bad = presale_payload(0);
    bad["slot_uid"] = Value::from("manual:77");
    let (status, err) = send(&app, "POST", "/api/presales", Some(bad)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "SLOT_NOT_FOUND");

    // Missing customer name → plain validation failure
    let mut bad = presale_payload(0);
    bad["customer_name"] = Value::from("");
    let (status, err) = send(&app, "POST", "/api/presales", Some(bad)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION");

    // Prepayment above total
    let (status, err) = send(&app, "POST", "/api/presales", Some(presale_payload(9999))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "PREPAYMENT_EXCEEDS_TOTAL");
}

#[tokio::test]
async fn test_mixed_accept_mismatch_over_http() {
    let app = test_app().await;
    send(&app, "POST", "/api/slots", Some(slot_payload())).await;
    let (_, p) = send(&app, "POST", "/api/presales", Some(presale_payload(0))).await;
    let id = p["id"].as_i64().unwrap();

    let (status, err) = send(
        &app,
        "PATCH",
        &format!("/api/presales/{id}/accept-payment"),
        Some(json!({"method": "MIXED", "cash_amount": 800, "card_amount": 400})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "MIXED_SPLIT_MISMATCH");
}

#[tokio::test]
async fn test_owner_override_lock_conflict() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/owner/overrides",
        Some(json!({
            "business_day": "2025-01-15",
            "revenue": 10000,
            "cash": 6000,
            "card": 4000,
            "tickets": 12
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, locked) = send(&app, "POST", "/api/owner/overrides/2025-01-15/lock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locked["locked"], true);

    // Locked override is immutable
    let (status, err) = send(
        &app,
        "POST",
        "/api/owner/overrides",
        Some(json!({
            "business_day": "2025-01-15",
            "revenue": 1,
            "cash": 1,
            "card": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["code"], "CONFLICT");

    // And fully supersedes the computed day figures
    let (_, summary) = send(
        &app,
        "GET",
        "/api/owner/money/summary?from=2025-01-15&to=2025-01-15",
        None,
    )
    .await;
    assert_eq!(summary["revenue"], 10000);
}
