//! Protocol outcomes returned by the coordinator.
//!
//! These are values, not errors: a conflict or a refused release is an
//! expected result that the caller turns into client-facing messages.

use seatlock_core::types::{SeatLabel, SeatLock};

/// How a successful acquire came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The seat was vacant.
    New,
    /// The requester already held the seat; its timestamp was reset.
    Refreshed,
    /// Another holder's expired lock was replaced.
    Reclaimed,
}

/// Result of [`LockCoordinator::acquire`](crate::LockCoordinator::acquire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireResult {
    /// The requester now holds the lock.
    Success {
        /// The stored lock.
        lock: SeatLock,
        /// How the lock was obtained.
        grant: Grant,
    },
    /// Another holder has a live lock on the seat. Nothing changed.
    Conflict {
        /// The seat that could not be locked.
        seat_label: SeatLabel,
    },
}

impl AcquireResult {
    /// Whether the acquire succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Result of [`LockCoordinator::release`](crate::LockCoordinator::release).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseResult {
    /// The requester's lock was removed.
    Released(SeatLock),
    /// No lock existed. Releasing twice is harmless.
    NotFound,
    /// The lock belongs to someone else and was left in place.
    NotOwner,
}
