//! Release announcement seam between the expiry sweeper and the realtime layer.

use async_trait::async_trait;

use crate::types::lock::SeatLock;

/// Publishes the release of a seat lock to everyone watching its showtime.
///
/// Implementations must not block: delivery is best-effort.
#[async_trait]
pub trait ReleaseAnnouncer: Send + Sync + 'static {
    /// Announce that `lock` no longer exists. Returns the number of
    /// recipients the announcement was queued for.
    async fn announce_release(&self, lock: &SeatLock) -> usize;
}
