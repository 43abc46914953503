//! Per-showtime ordering guards.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use seatlock_core::types::ShowtimeId;

type Guards = DashMap<ShowtimeId, Arc<Mutex<()>>>;

/// Hands out one mutex per showtime, created on demand.
///
/// An entry lives only while a guard for it is held or awaited, so the
/// map stays bounded by the number of showtimes in use.
#[derive(Debug, Default)]
pub struct Sequencer {
    guards: Arc<Guards>,
}

impl Sequencer {
    /// Creates an empty sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the guard of `showtime_id`.
    pub async fn enter(&self, showtime_id: &ShowtimeId) -> SequenceGuard {
        let mutex = self
            .guards
            .entry(showtime_id.clone())
            .or_default()
            .clone();
        let inner = mutex.lock_owned().await;
        SequenceGuard {
            inner: Some(inner),
            showtime_id: showtime_id.clone(),
            guards: Arc::clone(&self.guards),
        }
    }

    /// Showtimes with a guard held or awaited.
    pub fn active(&self) -> usize {
        self.guards.len()
    }
}

/// Exclusive ordering guard for one showtime.
///
/// Dropping it unlocks the showtime and removes its entry when no other
/// task holds or waits for it.
#[derive(Debug)]
pub struct SequenceGuard {
    inner: Option<OwnedMutexGuard<()>>,
    showtime_id: ShowtimeId,
    guards: Arc<Guards>,
}

impl Drop for SequenceGuard {
    fn drop(&mut self) {
        // Release the lock and its Arc before checking who else holds one.
        drop(self.inner.take());
        self.guards
            .remove_if(&self.showtime_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
