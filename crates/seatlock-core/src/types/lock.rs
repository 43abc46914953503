//! Seat-lock data model.
//!
//! A [`SeatLock`] is transient coordination state: a soft claim on one seat
//! of one showtime while its holder completes checkout. It is never
//! persisted and is unrelated to the durable booking record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::id::{HolderId, SeatLabel, ShowtimeId};

/// Composite identity of a seat lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatKey {
    /// Showtime the seat belongs to.
    pub showtime_id: ShowtimeId,
    /// Seat label within the showtime.
    pub seat_label: SeatLabel,
}

impl SeatKey {
    /// Create a new key.
    pub fn new(showtime_id: impl Into<ShowtimeId>, seat_label: impl Into<SeatLabel>) -> Self {
        Self {
            showtime_id: showtime_id.into(),
            seat_label: seat_label.into(),
        }
    }
}

/// A temporary claim on one seat of one showtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatLock {
    /// Showtime the seat belongs to.
    pub showtime_id: ShowtimeId,
    /// Seat label within the showtime.
    pub seat_label: SeatLabel,
    /// Current holder.
    pub holder_id: HolderId,
    /// Time of acquisition or last refresh.
    pub acquired_at: DateTime<Utc>,
}

impl SeatLock {
    /// Create a lock for `key` held by `holder_id` as of `acquired_at`.
    pub fn new(key: SeatKey, holder_id: HolderId, acquired_at: DateTime<Utc>) -> Self {
        Self {
            showtime_id: key.showtime_id,
            seat_label: key.seat_label,
            holder_id,
            acquired_at,
        }
    }

    /// The composite key of this lock.
    pub fn key(&self) -> SeatKey {
        SeatKey {
            showtime_id: self.showtime_id.clone(),
            seat_label: self.seat_label.clone(),
        }
    }

    /// Time elapsed since acquisition (or last refresh).
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.acquired_at
    }

    /// Whether the lock has outlived `timeout` at `now`.
    ///
    /// A lock whose age equals the timeout is already expired.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.age(now) >= timeout
    }

    /// Whether `holder` is the current holder.
    pub fn is_held_by(&self, holder: &HolderId) -> bool {
        &self.holder_id == holder
    }
}
