//! Integration tests for WebSocket connection and messaging over a real socket.

mod helpers;

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use helpers::{FRAME_TIMEOUT, TestApp, seat_event};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: SocketAddr, holder: &str) -> Socket {
    let url = format!("ws://{addr}/ws?holder_id={holder}");
    let (socket, _) = connect_async(url).await.expect("WebSocket handshake failed");
    socket
}

async fn send(socket: &mut Socket, frame: Value) {
    socket
        .send(Message::text(frame.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Next JSON text frame, skipping control frames.
async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(FRAME_TIMEOUT, socket.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
        }
    }
}

#[tokio::test]
async fn test_lock_round_trip() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut alice = connect(addr, "u1").await;
    let mut bob = connect(addr, "u2").await;

    for socket in [&mut alice, &mut bob] {
        send(socket, json!({"event": "join_showtime", "data": "S1"})).await;
        assert_eq!(
            next_json(socket).await,
            json!({"event": "initial_locks", "data": []})
        );
    }

    send(
        &mut alice,
        json!({
            "event": "request_lock",
            "data": {"showtimeId": "S1", "seatLabel": "A1", "userId": "u1"}
        }),
    )
    .await;
    assert_eq!(
        next_json(&mut alice).await,
        seat_event("lock_success", "S1", "A1")
    );
    assert_eq!(
        next_json(&mut bob).await,
        seat_event("seat_locked", "S1", "A1")
    );

    send(
        &mut alice,
        json!({"event": "release_lock", "data": {"showtimeId": "S1", "seatLabel": "A1"}}),
    )
    .await;
    let released = seat_event("seat_released", "S1", "A1");
    assert_eq!(next_json(&mut alice).await, released);
    assert_eq!(next_json(&mut bob).await, released);
}

#[tokio::test]
async fn test_malformed_frame_gets_error_reply() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut socket = connect(addr, "u1").await;

    socket
        .send(Message::text("{not json"))
        .await
        .expect("Failed to send frame");

    let reply = next_json(&mut socket).await;
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["data"]["code"], "INVALID_MESSAGE");

    // The connection survives a bad frame.
    send(&mut socket, json!({"event": "join_showtime", "data": "S1"})).await;
    assert_eq!(next_json(&mut socket).await["event"], "initial_locks");
}

#[tokio::test]
async fn test_close_unregisters_connection() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let mut socket = connect(addr, "u1").await;

    send(&mut socket, json!({"event": "join_showtime", "data": "S1"})).await;
    next_json(&mut socket).await;
    assert_eq!(app.engine.connection_count(), 1);

    socket.close(None).await.expect("Failed to close");

    tokio::time::timeout(FRAME_TIMEOUT, async {
        while app.engine.connection_count() > 0 || app.engine.room_count() > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("Connection was not cleaned up");
}
