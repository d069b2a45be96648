//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get};

// ---------------------------------------------------------------------------
// Test: GET /health reports version and database state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_degraded_without_database() {
    let t = build_test_app();
    t.submit_task("t1", "clip.mp4", common::OWNER);

    let response = get(&t.app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], false);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["tracked_tasks"], 1);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let t = build_test_app();
    let response = get(&t.app, "/this-route-does-not-exist", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let t = build_test_app();
    let response = get(&t.app, "/api/v1/files/progress/t1", Some(common::OWNER)).await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
    assert_eq!(request_id.unwrap().to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let t = build_test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/files/uploads")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "authorization")
        .body(Body::empty())
        .unwrap();
    let response = common::send(&t.app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}
