//! Host time adapter.
//!
//! Wall-clock seconds for reading and commit timestamps, plus a monotonic
//! uptime used by the status report.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.  `0` if the clock is set before 1970.
pub fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Monotonic process uptime.
pub struct Uptime {
    start: Instant,
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since construction (monotonic).
    pub fn secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}
