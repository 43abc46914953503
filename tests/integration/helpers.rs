//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use seatlock_api::{AppState, build_router};
use seatlock_core::config::AppConfig;
use seatlock_core::traits::ManualClock;
use seatlock_locks::{LockCoordinator, MemoryLockTable};
use seatlock_realtime::message::serializer::serialize_outbound;
use seatlock_realtime::{OutboundMessage, RealtimeEngine, SessionAdapter, SessionEvent};
use seatlock_worker::ExpirySweeper;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Engine shared by the router and direct sessions
    pub engine: RealtimeEngine,
    /// Clock driving lock timestamps
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application with default settings
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application from the given config
    pub fn with_config(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::at_epoch());
        let coordinator = Arc::new(LockCoordinator::new(
            Arc::new(MemoryLockTable::new()),
            config.locks.timeout(),
        ));
        let engine = RealtimeEngine::new(
            coordinator,
            clock.clone(),
            config.realtime.clone(),
            config.locks.release_on_disconnect,
        );
        let router = build_router(AppState::new(Arc::new(config.clone()), engine.clone()));

        Self {
            router,
            engine,
            clock,
            config,
        }
    }

    /// Sweeper over this app's coordinator, announcing through its rooms
    pub fn sweeper(&self) -> ExpirySweeper {
        ExpirySweeper::new(
            self.engine.coordinator.clone(),
            self.engine.announcer(),
            self.clock.clone(),
            self.config.locks.sweep_interval(),
        )
    }

    /// Advance the clock by whole seconds
    pub fn advance(&self, seconds: i64) {
        self.clock.advance(chrono::Duration::seconds(seconds));
    }

    /// Open a session that is driven directly, bypassing the socket
    pub fn client(&self, holder: Option<&str>) -> TestClient {
        let holder = holder.map(seatlock_core::types::HolderId::new);
        let (session, outbox) = self.engine.open_session(holder);
        TestClient { session, outbox }
    }

    /// Make a request to the test app
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the router on an ephemeral port
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });
        addr
    }
}

/// A session plus its outbox, speaking the JSON wire format
pub struct TestClient {
    /// Session under test
    pub session: SessionAdapter,
    /// Messages queued for this client
    pub outbox: mpsc::Receiver<OutboundMessage>,
}

impl TestClient {
    /// Send one raw text frame
    pub async fn send(&mut self, frame: Value) {
        self.session
            .handle(SessionEvent::Frame(frame.to_string()))
            .await;
    }

    /// Join a showtime room
    pub async fn join(&mut self, showtime: &str) {
        self.send(json!({"event": "join_showtime", "data": showtime}))
            .await;
    }

    /// Ask for a seat
    pub async fn request_lock(&mut self, showtime: &str, seat: &str, holder: &str) {
        self.send(json!({
            "event": "request_lock",
            "data": {"showtimeId": showtime, "seatLabel": seat, "holderId": holder}
        }))
        .await;
    }

    /// Give a seat back
    pub async fn release_lock(&mut self, showtime: &str, seat: &str) {
        self.send(json!({
            "event": "release_lock",
            "data": {"showtimeId": showtime, "seatLabel": seat}
        }))
        .await;
    }

    /// Drop the transport
    pub async fn disconnect(&mut self) {
        self.session.handle(SessionEvent::Disconnected).await;
    }

    /// Everything queued so far, as wire JSON
    pub fn drain(&mut self) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(msg) = self.outbox.try_recv() {
            let text = serialize_outbound(&msg).expect("Failed to serialize");
            out.push(serde_json::from_str(&text).expect("Invalid JSON"));
        }
        out
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Seat event payload as it appears on the wire
pub fn seat_event(event: &str, showtime: &str, seat: &str) -> Value {
    json!({"event": event, "data": {"showtimeId": showtime, "seatLabel": seat}})
}

/// Upper bound for waiting on a socket frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);
