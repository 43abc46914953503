//! Integration tests for the lock request / release protocol across sessions.

mod helpers;

use std::collections::HashMap;

use serde_json::json;

use helpers::{TestApp, seat_event};

#[tokio::test]
async fn test_contended_seat_flow() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    let mut u2 = app.client(None);
    let mut watcher = app.client(None);

    for client in [&mut u1, &mut u2, &mut watcher] {
        client.join("S1").await;
        assert_eq!(client.drain(), vec![json!({"event": "initial_locks", "data": []})]);
    }

    u1.request_lock("S1", "A1", "u1").await;
    assert_eq!(u1.drain(), vec![seat_event("lock_success", "S1", "A1")]);
    assert_eq!(u2.drain(), vec![seat_event("seat_locked", "S1", "A1")]);
    assert_eq!(watcher.drain(), vec![seat_event("seat_locked", "S1", "A1")]);

    u2.request_lock("S1", "A1", "u2").await;
    assert_eq!(
        u2.drain(),
        vec![json!({
            "event": "lock_failed",
            "data": {
                "showtimeId": "S1",
                "seatLabel": "A1",
                "message": "Seat is already locked by another user."
            }
        })]
    );
    assert!(u1.drain().is_empty());
    assert!(watcher.drain().is_empty());

    u1.release_lock("S1", "A1").await;
    let released = seat_event("seat_released", "S1", "A1");
    assert_eq!(u1.drain(), vec![released.clone()]);
    assert_eq!(u2.drain(), vec![released.clone()]);
    assert_eq!(watcher.drain(), vec![released]);

    u2.request_lock("S1", "A1", "u2").await;
    assert_eq!(u2.drain(), vec![seat_event("lock_success", "S1", "A1")]);
    assert_eq!(u1.drain(), vec![seat_event("seat_locked", "S1", "A1")]);
}

#[tokio::test]
async fn test_late_joiner_sees_current_locks() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    u1.join("S1").await;
    u1.request_lock("S1", "B2", "u1").await;
    u1.request_lock("S1", "A1", "u1").await;
    u1.release_lock("S1", "B2").await;

    let mut late = app.client(None);
    late.join("S1").await;
    assert_eq!(
        late.drain(),
        vec![json!({"event": "initial_locks", "data": ["A1"]})]
    );
}

#[tokio::test]
async fn test_showtimes_are_isolated() {
    let app = TestApp::new();
    let mut s1 = app.client(None);
    let mut s2 = app.client(None);
    s1.join("S1").await;
    s2.join("S2").await;
    s1.drain();
    s2.drain();

    s1.request_lock("S1", "A1", "u1").await;
    s2.request_lock("S2", "A1", "u2").await;

    assert_eq!(s1.drain(), vec![seat_event("lock_success", "S1", "A1")]);
    assert_eq!(s2.drain(), vec![seat_event("lock_success", "S2", "A1")]);
}

#[tokio::test]
async fn test_refresh_keeps_seat_for_holder() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    let mut u2 = app.client(None);
    u1.join("S1").await;
    u2.join("S1").await;

    u1.request_lock("S1", "A1", "u1").await;
    app.advance(500);
    u1.request_lock("S1", "A1", "u1").await;
    u1.drain();
    u2.drain();

    // 700s after the first grant but only 200s after the refresh.
    app.advance(200);
    u2.request_lock("S1", "A1", "u2").await;
    assert_eq!(
        u2.drain()[0]["event"],
        json!("lock_failed"),
        "refreshed lock must still be held"
    );
}

#[tokio::test]
async fn test_non_owner_release_is_refused() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    let mut u2 = app.client(Some("u2"));
    u1.join("S1").await;
    u2.join("S1").await;
    u1.request_lock("S1", "A1", "u1").await;
    u1.drain();
    u2.drain();

    u2.release_lock("S1", "A1").await;
    let replies = u2.drain();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["event"], "error");
    assert_eq!(replies[0]["data"]["code"], "NOT_OWNER");
    assert!(u1.drain().is_empty());

    let snapshot = app.request("GET", "/api/showtimes/S1/locks").await;
    assert_eq!(snapshot.body["data"]["seats"], json!(["A1"]));
}

#[tokio::test]
async fn test_disconnect_keeps_locks_by_default() {
    let app = TestApp::new();
    let mut u1 = app.client(None);
    u1.join("S1").await;
    u1.request_lock("S1", "A1", "u1").await;
    u1.disconnect().await;

    let snapshot = app.request("GET", "/api/showtimes/S1/locks").await;
    assert_eq!(snapshot.body["data"]["seats"], json!(["A1"]));
}

#[tokio::test]
async fn test_disconnect_releases_when_configured() {
    let mut config = seatlock_core::config::AppConfig::default();
    config.locks.release_on_disconnect = true;
    let app = TestApp::with_config(config);

    let mut u1 = app.client(None);
    let mut u2 = app.client(None);
    u1.join("S1").await;
    u2.join("S1").await;
    u1.request_lock("S1", "A1", "u1").await;
    u2.drain();

    u1.disconnect().await;
    assert_eq!(u2.drain(), vec![seat_event("seat_released", "S1", "A1")]);

    let snapshot = app.request("GET", "/api/showtimes/S1/locks").await;
    assert_eq!(snapshot.body["data"]["seats"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_member_sees_seat_changes_in_commit_order() {
    const SEATS: [&str; 3] = ["A1", "A2", "A3"];
    const ROUNDS: usize = 150;

    let mut config = seatlock_core::config::AppConfig::default();
    config.realtime.channel_buffer_size = 100_000;
    let app = TestApp::with_config(config);

    let mut watcher = app.client(None);
    watcher.join("S1").await;
    assert_eq!(watcher.drain(), vec![json!({"event": "initial_locks", "data": []})]);

    let mut workers = Vec::new();
    for n in 0..8 {
        let mut client = app.client(None);
        workers.push(tokio::spawn(async move {
            let holder = format!("u{n}");
            client.join("S1").await;
            for round in 0..ROUNDS {
                let seat = SEATS[(n + round) % SEATS.len()];
                client.request_lock("S1", seat, &holder).await;
                tokio::task::yield_now().await;
                // Seats won in the last round stay locked.
                if round + 1 < ROUNDS {
                    client.release_lock("S1", seat).await;
                }
            }
            client
        }));
    }
    // Keep sessions alive until the snapshot is taken.
    let mut finished = Vec::new();
    for worker in futures::future::join_all(workers).await {
        finished.push(worker.expect("worker task panicked"));
    }

    let mut held: HashMap<String, bool> = HashMap::new();
    for message in watcher.drain() {
        let event = message["event"].as_str().expect("event name");
        let seat = message["data"]["seatLabel"]
            .as_str()
            .expect("seat label")
            .to_owned();
        let was_held = held.get(&seat).copied().unwrap_or(false);
        match event {
            "seat_locked" => {
                assert!(!was_held, "{seat} announced locked twice in a row");
                held.insert(seat, true);
            }
            "seat_released" => {
                assert!(was_held, "{seat} announced released while free");
                held.insert(seat, false);
            }
            other => panic!("unexpected event {other}"),
        }
    }

    let snapshot = app.request("GET", "/api/showtimes/S1/locks").await;
    let locked: Vec<String> = serde_json::from_value(snapshot.body["data"]["seats"].clone())
        .expect("seat list");
    for seat in SEATS {
        assert_eq!(
            held.get(seat).copied().unwrap_or(false),
            locked.iter().any(|s| s == seat),
            "last announcement for {seat} disagrees with the table"
        );
    }
    drop(finished);
}
