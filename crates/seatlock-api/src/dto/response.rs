//! Response DTOs.

use serde::{Deserialize, Serialize};

use seatlock_core::types::{SeatLabel, ShowtimeId};
use seatlock_realtime::metrics::MetricsSnapshot;

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Rooms with at least one member.
    pub active_rooms: usize,
    /// Live seat locks.
    pub live_locks: usize,
    /// Lock timeout in seconds.
    pub lock_timeout_seconds: i64,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}

/// Seats currently locked in a showtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockSnapshotResponse {
    /// Showtime.
    pub showtime_id: ShowtimeId,
    /// Locked seats, sorted.
    pub seats: Vec<SeatLabel>,
}
