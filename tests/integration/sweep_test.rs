//! Integration tests for expiry sweeping and expiry takeover.

mod helpers;

use serde_json::json;

use helpers::{TestApp, seat_event};

#[tokio::test]
async fn test_sweep_releases_expired_seat_to_room() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    let mut u2 = app.client(None);
    u1.join("S1").await;
    u2.join("S1").await;

    u1.request_lock("S1", "B2", "u1").await;
    u1.drain();
    u2.drain();

    app.advance(601);
    let report = app
        .sweeper()
        .tick()
        .await
        .expect("sweep should not overlap")
        .unwrap();
    assert_eq!(report.released, 1);

    let released = seat_event("seat_released", "S1", "B2");
    assert_eq!(u1.drain(), vec![released.clone()]);
    assert_eq!(u2.drain(), vec![released]);

    u2.request_lock("S1", "B2", "u2").await;
    assert_eq!(u2.drain(), vec![seat_event("lock_success", "S1", "B2")]);

    let health = app.request("GET", "/api/health/detailed").await;
    assert_eq!(health.body["data"]["metrics"]["locks_expired"], 1);
}

#[tokio::test]
async fn test_sweep_leaves_live_locks() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    u1.join("S1").await;

    u1.request_lock("S1", "A1", "u1").await;
    app.advance(300);
    u1.request_lock("S1", "A2", "u1").await;
    app.advance(300);
    u1.drain();

    // A1 is exactly at the timeout, A2 is halfway.
    let report = app.sweeper().tick().await.unwrap().unwrap();
    assert_eq!(report.released, 1);
    assert_eq!(u1.drain(), vec![seat_event("seat_released", "S1", "A1")]);

    let snapshot = app.request("GET", "/api/showtimes/S1/locks").await;
    assert_eq!(snapshot.body["data"]["seats"], json!(["A2"]));
}

#[tokio::test]
async fn test_expired_seat_can_be_taken_before_sweep() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    let mut u2 = app.client(None);
    u1.join("S1").await;
    u2.join("S1").await;
    u1.request_lock("S1", "A1", "u1").await;
    u1.drain();
    u2.drain();

    app.advance(601);
    u2.request_lock("S1", "A1", "u2").await;
    assert_eq!(u2.drain(), vec![seat_event("lock_success", "S1", "A1")]);
    assert_eq!(u1.drain(), vec![seat_event("seat_locked", "S1", "A1")]);

    // The takeover reset the timestamp, so nothing is left to sweep.
    let report = app.sweeper().tick().await.unwrap().unwrap();
    assert_eq!(report.released, 0);
}
