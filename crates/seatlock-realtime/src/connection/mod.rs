//! WebSocket connection management: handles, pool, heartbeat.

pub mod handle;
pub mod heartbeat;
pub mod pool;

pub use handle::{ConnectionHandle, ConnectionId};
pub use heartbeat::HeartbeatConfig;
pub use pool::ConnectionPool;
