//! Session adapter: turns one connection's events into lock protocol calls.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use seatlock_core::error::{AppError, ErrorKind};
use seatlock_core::traits::Clock;
use seatlock_core::types::{HolderId, SeatKey, SeatLabel, ShowtimeId};
use seatlock_locks::{AcquireResult, ReleaseResult};

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::message::serializer::deserialize_inbound;
use crate::message::types::{
    InboundMessage, LockFailure, LockRequest, OutboundMessage, ReleaseRequest, SeatEvent, codes,
};
use crate::message::validator::{validate_frame, validate_inbound};
use crate::server::RealtimeEngine;

use super::event::SessionEvent;

/// Message sent with `lock_failed`.
const SEAT_TAKEN_MESSAGE: &str = "Seat is already locked by another user.";

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepting events. Room memberships live in the room registry.
    Connected,
    /// Transport closed. Further events are ignored.
    Disconnected,
}

/// State machine for one client connection.
///
/// Consumes [`SessionEvent`]s and calls the coordinator and broadcaster.
/// Lock changes are committed and announced while holding the showtime's
/// ordering guard, so room members see events in commit order.
#[derive(Debug)]
pub struct SessionAdapter {
    engine: RealtimeEngine,
    handle: Arc<ConnectionHandle>,
    /// Holder identity for releases of seats this session did not lock;
    /// bound at connect or by the latest `request_lock`.
    holder: Option<HolderId>,
    /// Seats this session acquired and has not released, with the holder
    /// each was locked for.
    acquired: HashMap<SeatKey, HolderId>,
    state: SessionState,
}

impl SessionAdapter {
    /// Creates a session for a registered connection.
    pub fn new(
        engine: RealtimeEngine,
        handle: Arc<ConnectionHandle>,
        holder: Option<HolderId>,
    ) -> Self {
        Self {
            engine,
            handle,
            holder,
            acquired: HashMap::new(),
            state: SessionState::Connected,
        }
    }

    /// Connection ID.
    pub fn conn_id(&self) -> ConnectionId {
        self.handle.id
    }

    /// Connection handle.
    pub fn connection(&self) -> &Arc<ConnectionHandle> {
        &self.handle
    }

    /// Current holder identity.
    pub fn holder(&self) -> Option<&HolderId> {
        self.holder.as_ref()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Consumes events until the transport disconnects or the sender is
    /// dropped. Always finishes in [`SessionState::Disconnected`].
    pub async fn run(mut self, mut events: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            if self.handle(event).await == SessionState::Disconnected {
                return;
            }
        }
        self.handle(SessionEvent::Disconnected).await;
    }

    /// Applies one event and returns the resulting state.
    pub async fn handle(&mut self, event: SessionEvent) -> SessionState {
        if self.state == SessionState::Disconnected {
            return self.state;
        }

        match event {
            SessionEvent::Frame(raw) => {
                self.engine.metrics.message_received();
                self.handle.touch().await;
                if let Err(e) = validate_frame(&raw) {
                    self.reply_error(&e).await;
                    return self.state;
                }
                match deserialize_inbound(&raw) {
                    Ok(msg) => self.dispatch(msg).await,
                    Err(e) => {
                        self.reply(OutboundMessage::error(
                            codes::INVALID_MESSAGE,
                            format!("Failed to parse message: {e}"),
                        ))
                        .await;
                    }
                }
            }
            SessionEvent::Message(msg) => {
                self.engine.metrics.message_received();
                self.handle.touch().await;
                self.dispatch(msg).await;
            }
            SessionEvent::Disconnected => self.on_disconnect().await,
        }

        self.state
    }

    async fn dispatch(&mut self, msg: InboundMessage) {
        if let Err(e) = validate_inbound(&msg) {
            self.reply_error(&e).await;
            return;
        }

        match msg {
            InboundMessage::JoinShowtime(showtime_id) => self.on_join(showtime_id).await,
            InboundMessage::LeaveShowtime(showtime_id) => {
                self.engine.broadcaster.leave(self.conn_id(), &showtime_id);
                debug!(conn_id = %self.conn_id(), showtime_id = %showtime_id, "Left showtime");
            }
            InboundMessage::RequestLock(req) => self.on_request_lock(req).await,
            InboundMessage::ReleaseLock(req) => self.on_release_lock(req).await,
        }
    }

    async fn on_join(&mut self, showtime_id: ShowtimeId) {
        let conn_id = self.conn_id();
        self.engine.broadcaster.join(conn_id, &showtime_id);

        let _order = self.engine.coordinator.sequence(&showtime_id).await;
        match self.engine.coordinator.snapshot(&showtime_id).await {
            Ok(seats) => {
                debug!(
                    conn_id = %conn_id,
                    showtime_id = %showtime_id,
                    locked = seats.len(),
                    "Joined showtime"
                );
                self.reply(OutboundMessage::InitialLocks(seats)).await;
            }
            Err(e) => self.reply_error(&e).await,
        }
    }

    async fn on_request_lock(&mut self, req: LockRequest) {
        let (showtime_id, seat_label, holder_id) = req.ids();
        if !self.require_joined(&showtime_id).await {
            return;
        }
        self.holder = Some(holder_id.clone());

        let coordinator = self.engine.coordinator.clone();
        let _order = coordinator.sequence(&showtime_id).await;
        let now = self.engine.clock().now();

        match coordinator
            .acquire(&showtime_id, &seat_label, &holder_id, now)
            .await
        {
            Ok(AcquireResult::Success { lock, .. }) => {
                self.acquired.insert(lock.key(), holder_id.clone());
                self.engine.metrics.lock_granted();
                let event = SeatEvent::new(showtime_id.clone(), seat_label);
                self.reply(OutboundMessage::LockSuccess(event.clone())).await;
                self.engine
                    .broadcaster
                    .broadcast(
                        &showtime_id,
                        OutboundMessage::SeatLocked(event),
                        Some(self.conn_id()),
                    )
                    .await;
            }
            Ok(AcquireResult::Conflict { seat_label }) => {
                self.engine.metrics.lock_conflicted();
                self.reply(OutboundMessage::LockFailed(LockFailure {
                    showtime_id,
                    seat_label,
                    message: SEAT_TAKEN_MESSAGE.to_string(),
                }))
                .await;
            }
            Err(e) => self.reply_error(&e).await,
        }
    }

    async fn on_release_lock(&mut self, req: ReleaseRequest) {
        let (showtime_id, seat_label) = req.ids();
        if !self.require_joined(&showtime_id).await {
            return;
        }
        let key = SeatKey {
            showtime_id: showtime_id.clone(),
            seat_label: seat_label.clone(),
        };
        let recorded = self.acquired.get(&key).cloned();
        let Some(holder_id) = recorded.or_else(|| self.holder.clone()) else {
            self.reply(OutboundMessage::error(
                codes::UNKNOWN_HOLDER,
                "No holder identity is bound to this connection",
            ))
            .await;
            return;
        };

        let coordinator = self.engine.coordinator.clone();
        let _order = coordinator.sequence(&showtime_id).await;

        match coordinator
            .release(&showtime_id, &seat_label, &holder_id)
            .await
        {
            Ok(ReleaseResult::Released(_)) => {
                self.acquired.remove(&key);
                self.announce_release(showtime_id, seat_label).await;
            }
            Ok(ReleaseResult::NotFound) => {
                self.acquired.remove(&key);
                debug!(
                    conn_id = %self.conn_id(),
                    showtime_id = %showtime_id,
                    seat_label = %seat_label,
                    "Release of unlocked seat ignored"
                );
            }
            Ok(ReleaseResult::NotOwner) => {
                self.acquired.remove(&key);
                self.reply(OutboundMessage::error(
                    codes::NOT_OWNER,
                    format!("Seat {seat_label} is locked by another user"),
                ))
                .await;
            }
            Err(e) => self.reply_error(&e).await,
        }
    }

    async fn on_disconnect(&mut self) {
        self.state = SessionState::Disconnected;
        let conn_id = self.conn_id();
        self.engine.broadcaster.unregister(conn_id);

        let mut released = 0usize;
        if self.engine.release_on_disconnect() {
            for (key, holder_id) in std::mem::take(&mut self.acquired) {
                if self.release_held(&key, &holder_id).await {
                    released += 1;
                }
            }
        }

        info!(
            conn_id = %conn_id,
            holder_id = ?self.holder.as_ref().map(HolderId::as_str),
            released,
            "Session closed"
        );
    }

    /// Releases `key` for `holder_id` during disconnect cleanup.
    async fn release_held(&self, key: &SeatKey, holder_id: &HolderId) -> bool {
        let coordinator = self.engine.coordinator.clone();
        let _order = coordinator.sequence(&key.showtime_id).await;
        match coordinator
            .release(&key.showtime_id, &key.seat_label, holder_id)
            .await
        {
            Ok(ReleaseResult::Released(_)) => {
                self.announce_release(key.showtime_id.clone(), key.seat_label.clone())
                    .await;
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!(
                    showtime_id = %key.showtime_id,
                    seat_label = %key.seat_label,
                    error = %e,
                    "Disconnect release failed"
                );
                false
            }
        }
    }

    async fn announce_release(&self, showtime_id: ShowtimeId, seat_label: SeatLabel) {
        self.engine.metrics.lock_released();
        let event = SeatEvent::new(showtime_id.clone(), seat_label);
        self.engine
            .broadcaster
            .broadcast(&showtime_id, OutboundMessage::SeatReleased(event), None)
            .await;
    }

    async fn require_joined(&self, showtime_id: &ShowtimeId) -> bool {
        if self.engine.broadcaster.is_member(self.conn_id(), showtime_id) {
            return true;
        }
        self.reply(OutboundMessage::error(
            codes::NOT_JOINED,
            format!("Join showtime {showtime_id} first"),
        ))
        .await;
        false
    }

    async fn reply(&self, msg: OutboundMessage) {
        self.engine.broadcaster.send_to(self.conn_id(), msg).await;
    }

    async fn reply_error(&self, err: &AppError) {
        let msg = match err.kind {
            ErrorKind::Validation | ErrorKind::Serialization => {
                OutboundMessage::error(err.kind.code(), err.message.clone())
            }
            _ => {
                error!(conn_id = %self.conn_id(), error = %err, "Session operation failed");
                OutboundMessage::error(ErrorKind::Internal.code(), "Internal server error")
            }
        };
        self.reply(msg).await;
    }
}
