//! Integration tests for the HTTP surface: health, snapshots, CORS.

mod helpers;

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use helpers::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_reports_engine_state() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    u1.join("S1").await;
    u1.request_lock("S1", "A1", "u1").await;

    let response = app.request("GET", "/api/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["ws_connections"], 1);
    assert_eq!(data["active_rooms"], 1);
    assert_eq!(data["live_locks"], 1);
    assert_eq!(data["lock_timeout_seconds"], 600);
    assert_eq!(data["metrics"]["locks_granted"], 1);
}

#[tokio::test]
async fn test_snapshot_endpoint() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    u1.join("S1").await;
    u1.request_lock("S1", "C3", "u1").await;
    u1.request_lock("S1", "A1", "u1").await;

    let response = app.request("GET", "/api/showtimes/S1/locks").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"],
        json!({"showtimeId": "S1", "seats": ["A1", "C3"]})
    );
}

#[tokio::test]
async fn test_snapshot_rejects_overlong_id() {
    let app = TestApp::new();
    let path = format!("/api/showtimes/{}/locks", "s".repeat(129));

    let response = app.request("GET", &path).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/nope").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = TestApp::new();

    let response = app.request("GET", "/ws").await;

    assert!(
        response.status.is_client_error(),
        "Expected a 4xx rejection, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = TestApp::new();
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/health")
        .header("Origin", "https://tickets.example")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
