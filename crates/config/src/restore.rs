#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

/// Tunables for the layout restoration engine.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Restore {
    /// Pause after activating an app before its window geometry is changed.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub settle_delay: Duration,

    /// Largest per-axis difference (points) still treated as "in place".
    pub geometry_tolerance: u32,

    /// Upper bound on waiting for a launched app's first window, in seconds.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub window_timeout: Duration,

    /// Poll interval used right after a launch.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub poll_fine_interval: Duration,

    /// How long the fine interval is used before switching to the coarse one.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub poll_fine_phase: Duration,

    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub poll_coarse_interval: Duration,

    /// Hide running apps that the restored snapshot does not reference.
    pub hide_others: bool,
}

impl Default for Restore {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(100),
            geometry_tolerance: 2,
            window_timeout: Duration::from_secs(30),
            poll_fine_interval: Duration::from_millis(200),
            poll_fine_phase: Duration::from_secs(3),
            poll_coarse_interval: Duration::from_secs(1),
            hide_others: true,
        }
    }
}

impl Restore {
    /// Poll intervals never drop below this, so a zeroed config cannot spin.
    pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Sleep between window polls, given the time already spent waiting.
    pub fn poll_interval(&self, elapsed: Duration) -> Duration {
        let interval = if elapsed < self.poll_fine_phase {
            self.poll_fine_interval
        } else {
            self.poll_coarse_interval
        };
        interval.max(Self::MIN_POLL_INTERVAL)
    }
}
