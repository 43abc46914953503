//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use seatlock_core::types::HolderId;
use seatlock_core::types::id::validate_identifier;
use seatlock_realtime::connection::heartbeat::run_heartbeat;
use seatlock_realtime::message::serializer::serialize_outbound;
use seatlock_realtime::{OutboundMessage, SessionEvent};

use crate::error::ApiError;
use crate::state::AppState;

/// Pending inbound frames per connection.
const EVENT_BUFFER: usize = 64;

/// How long the writer gets to flush after the session ends.
const WRITER_DRAIN: Duration = Duration::from_secs(2);

/// Optional holder binding for the connection.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Holder the connection acts for until a lock request names another.
    #[serde(alias = "userId")]
    pub holder_id: Option<String>,
}

/// GET /ws?holder_id={id}: WebSocket upgrade
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let holder = match query.holder_id {
        Some(id) => {
            validate_identifier("holder_id", &id)?;
            Some(HolderId::new(id))
        }
        None => None,
    };

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, holder, socket)))
}

/// Drives an established WebSocket connection until either side closes.
async fn handle_ws_connection(state: AppState, holder: Option<HolderId>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let engine = state.engine.clone();

    let (session, mut outbound_rx) = engine.open_session(holder);
    let handle = session.connection().clone();
    let conn_id = handle.id;

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let session_task = tokio::spawn(session.run(events_rx));

    // Outbound forwarder
    let writer_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let frame = match msg {
                OutboundMessage::Ping { .. } => Message::Ping(Vec::new().into()),
                other => match serialize_outbound(&other) {
                    Ok(text) => Message::Text(text.into()),
                    Err(e) => {
                        warn!(conn_id = %conn_id, error = %e, "Failed to serialize outbound message");
                        continue;
                    }
                },
            };
            if ws_tx.send(frame).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let mut heartbeat_task = tokio::spawn(run_heartbeat(handle.clone(), engine.heartbeat_config()));
    let mut shutdown_rx = engine.shutdown_receiver();

    info!(conn_id = %conn_id, "WebSocket connection established");

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if events_tx.send(SessionEvent::Frame(text.as_str().to_owned())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Pong(_))) => handle.touch().await,
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = &mut heartbeat_task => {
                debug!(conn_id = %conn_id, "Heartbeat expired");
                break;
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    // Cleanup
    let _ = events_tx.send(SessionEvent::Disconnected).await;
    drop(events_tx);
    let _ = session_task.await;
    heartbeat_task.abort();
    drop(handle);
    let _ = tokio::time::timeout(WRITER_DRAIN, writer_task).await;

    info!(conn_id = %conn_id, "WebSocket connection closed");
}
