//! Lock table trait: storage of seat locks keyed by `(showtime, seat)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::result::AppResult;
use crate::types::id::{HolderId, SeatLabel, ShowtimeId};
use crate::types::lock::{SeatKey, SeatLock};

/// Result of a conditional [`LockTable::claim`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The lock was written. `previous` is the entry it replaced, if any.
    Granted {
        /// Replaced entry (same-holder refresh or expired lock).
        previous: Option<SeatLock>,
    },
    /// A live lock held by another holder blocked the write.
    Held(SeatLock),
}

/// Result of a holder-checked [`LockTable::remove_held_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The entry was removed.
    Removed(SeatLock),
    /// No entry existed for the key.
    Missing,
    /// The entry is held by someone else and was left untouched.
    HeldByOther(HolderId),
}

/// Storage of [`SeatLock`] entries keyed by [`SeatKey`].
///
/// Every mutating operation must be atomic with respect to concurrent
/// callers on the same key. Conditional operations evaluate their
/// condition and apply their write in one step, so two competing claims
/// never both succeed and a sweep never deletes a lock refreshed after
/// it was enumerated.
///
/// Operations are fallible so the table can be backed by an external
/// store; a failed operation must leave prior state untouched.
#[async_trait]
pub trait LockTable: Send + Sync + 'static {
    /// Look up the lock for `key`.
    async fn get(&self, key: &SeatKey) -> AppResult<Option<SeatLock>>;

    /// Insert or overwrite unconditionally. Returns the replaced entry.
    async fn put(&self, lock: SeatLock) -> AppResult<Option<SeatLock>>;

    /// Remove the entry for `key`. Idempotent.
    async fn remove(&self, key: &SeatKey) -> AppResult<Option<SeatLock>>;

    /// Seat labels currently locked in a showtime. Order is unspecified.
    async fn list_by_showtime(&self, showtime_id: &ShowtimeId) -> AppResult<Vec<SeatLabel>>;

    /// Every entry in the table. Each entry is observed whole.
    async fn all_entries(&self) -> AppResult<Vec<SeatLock>>;

    /// Write `lock` if its key is vacant, already held by `lock.holder_id`,
    /// or held by a lock acquired at or before `expired_cutoff`.
    async fn claim(&self, lock: SeatLock, expired_cutoff: DateTime<Utc>) -> AppResult<Claim>;

    /// Remove the entry for `key` only if `holder` holds it.
    async fn remove_held_by(&self, key: &SeatKey, holder: &HolderId) -> AppResult<Removal>;

    /// Remove the entry for `key` only if it was acquired at or before
    /// `expired_cutoff` at the moment of removal.
    async fn remove_if_expired(
        &self,
        key: &SeatKey,
        expired_cutoff: DateTime<Utc>,
    ) -> AppResult<Option<SeatLock>>;

    /// Number of live entries.
    async fn len(&self) -> AppResult<usize>;
}
