//! In-memory lock table sharded by showtime.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::trace;

use seatlock_core::result::AppResult;
use seatlock_core::traits::lock_table::{Claim, LockTable, Removal};
use seatlock_core::types::{HolderId, SeatKey, SeatLabel, SeatLock, ShowtimeId};

/// In-memory [`LockTable`] for single-node deployments.
///
/// Locks are grouped per showtime: `showtime → (seat → lock)`. Each
/// operation holds exactly one showtime shard while it reads and writes,
/// which makes it atomic for every key in that showtime. No operation
/// ever holds two shards at once.
#[derive(Debug, Default)]
pub struct MemoryLockTable {
    /// Showtime ID → seat locks in that showtime.
    shards: DashMap<ShowtimeId, HashMap<SeatLabel, SeatLock>>,
}

impl MemoryLockTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the shard for `showtime_id` if it holds no locks.
    fn prune(&self, showtime_id: &ShowtimeId) {
        self.shards.remove_if(showtime_id, |_, seats| seats.is_empty());
    }

    /// Removes `key` if `pred` accepts the current entry.
    fn remove_where(
        &self,
        key: &SeatKey,
        pred: impl FnOnce(&SeatLock) -> bool,
    ) -> Option<SeatLock> {
        let removed = {
            let mut shard = self.shards.get_mut(&key.showtime_id)?;
            let accept = shard.get(&key.seat_label).is_some_and(pred);
            if accept {
                shard.remove(&key.seat_label)
            } else {
                None
            }
        };
        if removed.is_some() {
            self.prune(&key.showtime_id);
        }
        removed
    }
}

#[async_trait]
impl LockTable for MemoryLockTable {
    async fn get(&self, key: &SeatKey) -> AppResult<Option<SeatLock>> {
        Ok(self
            .shards
            .get(&key.showtime_id)
            .and_then(|seats| seats.get(&key.seat_label).cloned()))
    }

    async fn put(&self, lock: SeatLock) -> AppResult<Option<SeatLock>> {
        let previous = self
            .shards
            .entry(lock.showtime_id.clone())
            .or_default()
            .insert(lock.seat_label.clone(), lock);
        Ok(previous)
    }

    async fn remove(&self, key: &SeatKey) -> AppResult<Option<SeatLock>> {
        Ok(self.remove_where(key, |_| true))
    }

    async fn list_by_showtime(&self, showtime_id: &ShowtimeId) -> AppResult<Vec<SeatLabel>> {
        Ok(self
            .shards
            .get(showtime_id)
            .map(|seats| seats.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn all_entries(&self) -> AppResult<Vec<SeatLock>> {
        let mut entries = Vec::new();
        for shard in self.shards.iter() {
            entries.extend(shard.value().values().cloned());
        }
        Ok(entries)
    }

    async fn claim(&self, lock: SeatLock, expired_cutoff: DateTime<Utc>) -> AppResult<Claim> {
        let mut shard = self.shards.entry(lock.showtime_id.clone()).or_default();

        let blocking = shard
            .get(&lock.seat_label)
            .filter(|existing| {
                !existing.is_held_by(&lock.holder_id) && existing.acquired_at > expired_cutoff
            })
            .cloned();

        if let Some(existing) = blocking {
            return Ok(Claim::Held(existing));
        }

        trace!(
            showtime_id = %lock.showtime_id,
            seat_label = %lock.seat_label,
            holder_id = %lock.holder_id,
            "Claim written"
        );
        let previous = shard.insert(lock.seat_label.clone(), lock);
        Ok(Claim::Granted { previous })
    }

    async fn remove_held_by(&self, key: &SeatKey, holder: &HolderId) -> AppResult<Removal> {
        let mut other = None;
        let removed = self.remove_where(key, |existing| {
            if existing.is_held_by(holder) {
                true
            } else {
                other = Some(existing.holder_id.clone());
                false
            }
        });

        Ok(match (removed, other) {
            (Some(lock), _) => Removal::Removed(lock),
            (None, Some(holder)) => Removal::HeldByOther(holder),
            (None, None) => Removal::Missing,
        })
    }

    async fn remove_if_expired(
        &self,
        key: &SeatKey,
        expired_cutoff: DateTime<Utc>,
    ) -> AppResult<Option<SeatLock>> {
        Ok(self.remove_where(key, |existing| existing.acquired_at <= expired_cutoff))
    }

    async fn len(&self) -> AppResult<usize> {
        Ok(self.shards.iter().map(|shard| shard.value().len()).sum())
    }
}
