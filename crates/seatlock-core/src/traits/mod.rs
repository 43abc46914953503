//! Core trait definitions.
//!
//! These traits define the contracts that infrastructure crates implement.

pub mod announcer;
pub mod clock;
pub mod lock_table;

pub use announcer::ReleaseAnnouncer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use lock_table::{Claim, LockTable, Removal};
