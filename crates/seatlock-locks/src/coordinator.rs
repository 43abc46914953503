//! Lock coordinator: acquire/release protocol over a [`LockTable`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use seatlock_core::result::AppResult;
use seatlock_core::traits::lock_table::{Claim, LockTable, Removal};
use seatlock_core::types::id::validate_identifier;
use seatlock_core::types::{HolderId, SeatKey, SeatLabel, SeatLock, ShowtimeId};

use crate::outcome::{AcquireResult, Grant, ReleaseResult};
use crate::sequencer::{SequenceGuard, Sequencer};

/// Enforces the seat-lock protocol.
///
/// Rules for `acquire` on a key:
/// - vacant: grant
/// - held by the requester (expired or not): refresh in place
/// - held by someone else, expired: grant to the requester
/// - held by someone else, live: conflict, no state change
///
/// Conflict resolution is first-writer-wins at the table's serialization
/// point; there is no queueing of competing requests.
pub struct LockCoordinator {
    /// Backing table.
    table: Arc<dyn LockTable>,
    /// Age at which a lock expires.
    timeout: Duration,
    /// Publication order guards.
    sequencer: Sequencer,
}

impl std::fmt::Debug for LockCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockCoordinator")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LockCoordinator {
    /// Creates a coordinator over `table` with the given lock timeout.
    pub fn new(table: Arc<dyn LockTable>, timeout: Duration) -> Self {
        Self {
            table,
            timeout,
            sequencer: Sequencer::new(),
        }
    }

    /// Age at which a lock expires.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquires the publication order guard for a showtime.
    ///
    /// Hold it across "commit a change, then enqueue its room event" so
    /// every room member sees events in commit order. Enqueueing must not
    /// block while the guard is held.
    pub async fn sequence(&self, showtime_id: &ShowtimeId) -> SequenceGuard {
        self.sequencer.enter(showtime_id).await
    }

    /// Showtimes whose ordering guard is currently held or awaited.
    pub fn sequenced_showtimes(&self) -> usize {
        self.sequencer.active()
    }

    /// Attempts to lock `seat_label` of `showtime_id` for `holder_id` at `now`.
    pub async fn acquire(
        &self,
        showtime_id: &ShowtimeId,
        seat_label: &SeatLabel,
        holder_id: &HolderId,
        now: DateTime<Utc>,
    ) -> AppResult<AcquireResult> {
        validate_identifier("showtimeId", showtime_id.as_str())?;
        validate_identifier("seatLabel", seat_label.as_str())?;
        validate_identifier("holderId", holder_id.as_str())?;

        let key = SeatKey {
            showtime_id: showtime_id.clone(),
            seat_label: seat_label.clone(),
        };
        let lock = SeatLock::new(key, holder_id.clone(), now);

        match self.table.claim(lock.clone(), now - self.timeout).await? {
            Claim::Granted { previous } => {
                let grant = match previous {
                    None => Grant::New,
                    Some(ref prev) if prev.is_held_by(holder_id) => Grant::Refreshed,
                    Some(_) => Grant::Reclaimed,
                };
                info!(
                    showtime_id = %showtime_id,
                    seat_label = %seat_label,
                    holder_id = %holder_id,
                    grant = ?grant,
                    "Seat locked"
                );
                Ok(AcquireResult::Success { lock, grant })
            }
            Claim::Held(existing) => {
                debug!(
                    showtime_id = %showtime_id,
                    seat_label = %seat_label,
                    holder_id = %holder_id,
                    held_by = %existing.holder_id,
                    "Seat lock conflict"
                );
                Ok(AcquireResult::Conflict {
                    seat_label: seat_label.clone(),
                })
            }
        }
    }

    /// Releases `seat_label` of `showtime_id` on behalf of `requester_id`.
    pub async fn release(
        &self,
        showtime_id: &ShowtimeId,
        seat_label: &SeatLabel,
        requester_id: &HolderId,
    ) -> AppResult<ReleaseResult> {
        let key = SeatKey {
            showtime_id: showtime_id.clone(),
            seat_label: seat_label.clone(),
        };

        match self.table.remove_held_by(&key, requester_id).await? {
            Removal::Removed(lock) => {
                info!(
                    showtime_id = %showtime_id,
                    seat_label = %seat_label,
                    holder_id = %requester_id,
                    "Seat released"
                );
                Ok(ReleaseResult::Released(lock))
            }
            Removal::Missing => Ok(ReleaseResult::NotFound),
            Removal::HeldByOther(holder) => {
                debug!(
                    showtime_id = %showtime_id,
                    seat_label = %seat_label,
                    requester_id = %requester_id,
                    held_by = %holder,
                    "Release refused: not the holder"
                );
                Ok(ReleaseResult::NotOwner)
            }
        }
    }

    /// Seats currently locked in a showtime, sorted by label.
    pub async fn snapshot(&self, showtime_id: &ShowtimeId) -> AppResult<Vec<SeatLabel>> {
        let mut seats = self.table.list_by_showtime(showtime_id).await?;
        seats.sort();
        Ok(seats)
    }

    /// Every lock that is expired at `now`.
    pub async fn expired(&self, now: DateTime<Utc>) -> AppResult<Vec<SeatLock>> {
        Ok(self
            .table
            .all_entries()
            .await?
            .into_iter()
            .filter(|lock| lock.is_expired(now, self.timeout))
            .collect())
    }

    /// Removes the lock for `key` if it is still expired at `now`.
    ///
    /// A lock refreshed after it was enumerated survives.
    pub async fn evict_if_expired(
        &self,
        key: &SeatKey,
        now: DateTime<Utc>,
    ) -> AppResult<Option<SeatLock>> {
        self.table.remove_if_expired(key, now - self.timeout).await
    }

    /// Number of live locks.
    pub async fn lock_count(&self) -> AppResult<usize> {
        self.table.len().await
    }
}
