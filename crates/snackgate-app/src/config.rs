//! Session configuration.

use std::{num::NonZeroU32, time::Duration};

use snackgate_core::{DEFAULT_LIMIT, DEFAULT_LOG_CAPACITY, DEFAULT_TICK_PERIOD, DEFAULT_VISIT_CAPACITY};

/// Lockout length until the operator applies another. Zero disables the
/// countdown.
pub const DEFAULT_LOCK_MINUTES: u32 = 0;

/// Initial values and capacities for an [`crate::App`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Visit quota before any `LIMIT` is applied.
    pub initial_limit: NonZeroU32,
    /// Lockout length before any `LOCKTIME` is applied.
    pub initial_lock_minutes: u32,
    /// Visits kept in history.
    pub visit_capacity: usize,
    /// Diagnostic lines kept in history.
    pub log_capacity: usize,
    /// Cooldown sampling period.
    pub cooldown_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_limit: DEFAULT_LIMIT,
            initial_lock_minutes: DEFAULT_LOCK_MINUTES,
            visit_capacity: DEFAULT_VISIT_CAPACITY,
            log_capacity: DEFAULT_LOG_CAPACITY,
            cooldown_period: DEFAULT_TICK_PERIOD,
        }
    }
}
