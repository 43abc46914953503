//! Shared domain types used across all crates.

pub mod id;
pub mod lock;

pub use id::{HolderId, SeatLabel, ShowtimeId};
pub use lock::{SeatKey, SeatLock};
