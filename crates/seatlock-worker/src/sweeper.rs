//! Expiry sweep: reclaims abandoned seat locks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing;

use seatlock_core::result::AppResult;
use seatlock_core::traits::{Clock, ReleaseAnnouncer};
use seatlock_locks::LockCoordinator;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Locks found expired when the pass started.
    pub scanned: usize,
    /// Locks actually removed and announced.
    pub released: usize,
}

/// Removes expired locks and announces each release to its room.
///
/// A candidate is re-checked at removal time, so a lock refreshed or
/// released after enumeration is left alone.
pub struct ExpirySweeper {
    coordinator: Arc<LockCoordinator>,
    announcer: Arc<dyn ReleaseAnnouncer>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    /// Held for the duration of a pass.
    running: Mutex<()>,
}

impl std::fmt::Debug for ExpirySweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper")
            .field("interval", &self.interval)
            .finish()
    }
}

impl ExpirySweeper {
    /// Create a sweeper that runs every `interval`.
    pub fn new(
        coordinator: Arc<LockCoordinator>,
        announcer: Arc<dyn ReleaseAnnouncer>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            announcer,
            clock,
            interval,
            running: Mutex::new(()),
        }
    }

    /// Period between passes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one pass at the clock's current time.
    ///
    /// Returns `None` if a previous pass is still running.
    pub async fn tick(&self) -> Option<AppResult<SweepReport>> {
        let Ok(_running) = self.running.try_lock() else {
            tracing::debug!("Previous sweep still running, skipping tick");
            return None;
        };
        Some(self.sweep(self.clock.now()).await)
    }

    /// Run one pass as of `now`.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<SweepReport> {
        let candidates = self.coordinator.expired(now).await?;
        let mut report = SweepReport {
            scanned: candidates.len(),
            released: 0,
        };

        for candidate in candidates {
            let key = candidate.key();
            let _order = self.coordinator.sequence(&key.showtime_id).await;

            let Some(lock) = self.coordinator.evict_if_expired(&key, now).await? else {
                tracing::debug!(
                    showtime_id = %key.showtime_id,
                    seat_label = %key.seat_label,
                    "Lock changed since enumeration, kept"
                );
                continue;
            };

            let recipients = self.announcer.announce_release(&lock).await;
            tracing::debug!(
                showtime_id = %lock.showtime_id,
                seat_label = %lock.seat_label,
                holder_id = %lock.holder_id,
                recipients,
                "Expired seat lock released"
            );
            report.released += 1;
        }

        if report.released > 0 {
            tracing::info!(
                released = report.released,
                scanned = report.scanned,
                "Released {} expired seat locks",
                report.released
            );
        }

        Ok(report)
    }
}
