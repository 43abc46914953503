//! Seat-lock protocol configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted lock timeout or sweep interval (7 days).
const MAX_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Lock timeout, sweep cadence, and disconnect policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    /// Seconds after acquisition (or last refresh) at which a lock expires.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Seconds between expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Release the locks a connection acquired when it disconnects.
    ///
    /// Off by default: a dropped client keeps its seats until the sweep,
    /// so a quick reconnect does not lose them.
    #[serde(default)]
    pub release_on_disconnect: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
            release_on_disconnect: false,
        }
    }
}

impl LockConfig {
    /// Lock timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::seconds(self.timeout_seconds as i64)
    }

    /// Sweep interval as a std duration.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_seconds)
    }

    /// Reject non-positive or absurd values before the sweeper starts.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "locks.timeout_seconds must be positive",
            ));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "locks.sweep_interval_seconds must be positive",
            ));
        }
        if self.timeout_seconds > MAX_SECONDS || self.sweep_interval_seconds > MAX_SECONDS {
            return Err(AppError::configuration(format!(
                "locks timings must not exceed {MAX_SECONDS} seconds"
            )));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    600
}

fn default_sweep_interval() -> u64 {
    60
}
