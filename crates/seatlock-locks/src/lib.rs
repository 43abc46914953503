//! Seat-lock table and coordination protocol.
//!
//! Provides:
//! - [`MemoryLockTable`]: an in-process [`LockTable`] sharded by showtime
//! - [`LockCoordinator`]: the acquire/release protocol and conflict rules
//! - [`Sequencer`]: per-showtime ordering guards
//!
//! [`LockTable`]: seatlock_core::traits::LockTable

pub mod coordinator;
pub mod outcome;
pub mod sequencer;
pub mod table;

pub use coordinator::LockCoordinator;
pub use outcome::{AcquireResult, Grant, ReleaseResult};
pub use sequencer::{SequenceGuard, Sequencer};
pub use table::MemoryLockTable;
