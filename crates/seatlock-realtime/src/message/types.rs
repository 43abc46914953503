//! Inbound and outbound WebSocket message type definitions.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use seatlock_core::types::{HolderId, SeatLabel, ShowtimeId};

/// Error codes sent in [`OutboundMessage::Error`].
pub mod codes {
    /// Frame could not be parsed.
    pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
    /// Request for a showtime the connection has not joined.
    pub const NOT_JOINED: &str = "NOT_JOINED";
    /// Release before any holder identity is known.
    pub const UNKNOWN_HOLDER: &str = "UNKNOWN_HOLDER";
    /// Release of a lock held by someone else.
    pub const NOT_OWNER: &str = "NOT_OWNER";
}

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Join a showtime's room and receive its lock snapshot.
    JoinShowtime(ShowtimeId),
    /// Leave a showtime's room.
    LeaveShowtime(ShowtimeId),
    /// Attempt to lock a seat.
    RequestLock(LockRequest),
    /// Release a seat held by this connection's holder.
    ReleaseLock(ReleaseRequest),
}

/// Payload of `request_lock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    /// Showtime.
    #[validate(length(min = 1, max = 128, message = "Showtime ID must be between 1 and 128 characters"))]
    pub showtime_id: String,
    /// Seat.
    #[validate(length(min = 1, max = 128, message = "Seat label must be between 1 and 128 characters"))]
    pub seat_label: String,
    /// Requesting holder.
    #[serde(alias = "userId")]
    #[validate(length(min = 1, max = 128, message = "Holder ID must be between 1 and 128 characters"))]
    pub holder_id: String,
}

impl LockRequest {
    /// Typed identifiers.
    pub fn ids(&self) -> (ShowtimeId, SeatLabel, HolderId) {
        (
            ShowtimeId::new(self.showtime_id.as_str()),
            SeatLabel::new(self.seat_label.as_str()),
            HolderId::new(self.holder_id.as_str()),
        )
    }
}

/// Payload of `release_lock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRequest {
    /// Showtime.
    #[validate(length(min = 1, max = 128, message = "Showtime ID must be between 1 and 128 characters"))]
    pub showtime_id: String,
    /// Seat.
    #[validate(length(min = 1, max = 128, message = "Seat label must be between 1 and 128 characters"))]
    pub seat_label: String,
}

impl ReleaseRequest {
    /// Typed identifiers.
    pub fn ids(&self) -> (ShowtimeId, SeatLabel) {
        (
            ShowtimeId::new(self.showtime_id.as_str()),
            SeatLabel::new(self.seat_label.as_str()),
        )
    }
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Seats locked in a showtime at join time.
    InitialLocks(Vec<SeatLabel>),
    /// The requester now holds the seat.
    LockSuccess(SeatEvent),
    /// The seat is held by someone else.
    LockFailed(LockFailure),
    /// Another member locked a seat.
    SeatLocked(SeatEvent),
    /// A seat lock was released or expired.
    SeatReleased(SeatEvent),
    /// Request-level error.
    Error(ErrorPayload),
    /// Keepalive. Written as a WebSocket ping frame, not as JSON.
    Ping {
        /// Server timestamp in milliseconds.
        timestamp: i64,
    },
}

impl OutboundMessage {
    /// Builds an `error` message.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code: code.into(),
            message: message.into(),
        })
    }
}

/// A seat in a showtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatEvent {
    /// Showtime the seat belongs to.
    pub showtime_id: ShowtimeId,
    /// Seat.
    pub seat_label: SeatLabel,
}

impl SeatEvent {
    /// Creates a seat event.
    pub fn new(showtime_id: ShowtimeId, seat_label: SeatLabel) -> Self {
        Self {
            showtime_id,
            seat_label,
        }
    }
}

/// Payload of `lock_failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockFailure {
    /// Showtime the seat belongs to.
    pub showtime_id: ShowtimeId,
    /// The seat that could not be locked.
    pub seat_label: SeatLabel,
    /// Human-readable reason.
    pub message: String,
}

/// Payload of `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Machine-readable code.
    pub code: String,
    /// Error description.
    pub message: String,
}
