//! Production Environment implementation.
//!
//! `SystemEnv` reads the tokio clock for durations, so a paused test runtime
//! freezes it too, and the system clock for display timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

use snackgate_core::Environment;

/// Production environment using the tokio and system clocks.
#[derive(Clone, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn wall_clock_secs(&self) -> u64 {
        // A clock set before 1970 shows timestamps as zero
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
    }
}
