//! Showtime rooms: membership and the per-connection reverse index.

pub mod registry;
pub mod room;
pub mod subscription;

pub use registry::RoomRegistry;
pub use room::Room;
pub use subscription::SubscriptionTracker;
