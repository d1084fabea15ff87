//! Environment abstraction for deterministic testing.
//!
//! Decouples state logic from the system clock. Production uses the tokio
//! clock (which also honours paused time in tests), while simulation uses a
//! manually advanced virtual clock.

use std::{fmt::Debug, ops::Sub, time::Duration};

/// Abstract environment providing time.
///
/// # Invariants
///
/// - `now()` never goes backwards within a single execution context
/// - `wall_clock_secs()` is only used for display timestamps, never for
///   durations
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `tokio::time::Instant`, while simulation
    /// environments use virtual time.
    type Instant: Copy + Ord + Debug + Send + Sync + Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Seconds since the Unix epoch, for timestamping log entries and visits.
    fn wall_clock_secs(&self) -> u64;
}
