//! Lockout countdown.
//!
//! The remaining lockout time is derived from the lock anchor and the
//! configured duration, never from message arrival. The clock only reports;
//! clearing the anchor is left to the reconciler (an `Unlocked` event or a
//! non-zero `RemainingCount`), so a countdown that reaches zero stays at zero
//! until the device confirms the release.

use std::{ops::Sub, time::Duration};

use crate::state::AppState;

/// Interval between countdown samples.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Seconds left in the lockout that started at `anchor`.
///
/// Elapsed time is floored to whole seconds. Returns 0 when there is no
/// anchor, when the duration is zero, or when the lockout has run out.
pub fn remaining_secs<I>(anchor: Option<I>, lock_duration_minutes: u32, now: I) -> u64
where
    I: Copy + Sub<Output = Duration>,
{
    let Some(anchor) = anchor else {
        return 0;
    };

    let total = u64::from(lock_duration_minutes) * 60;
    let elapsed = (now - anchor).as_secs();
    total.saturating_sub(elapsed)
}

/// Periodic sampler of the remaining lockout time.
///
/// The runtime keeps a tick source running only while [`CooldownClock::is_armed`]
/// holds, and calls [`CooldownClock::sample`] on each tick.
#[derive(Debug, Clone)]
pub struct CooldownClock {
    period: Duration,
    remaining: u64,
}

impl Default for CooldownClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl CooldownClock {
    /// Create a clock that ticks every `period`.
    pub fn new(period: Duration) -> Self {
        Self { period, remaining: 0 }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// True while a countdown should be running for `state`.
    pub fn is_armed<I: Copy>(state: &AppState<I>) -> bool {
        state.lock_anchor().is_some() && state.lock_duration_minutes() > 0
    }

    /// Recompute the remaining seconds for `state` at `now`.
    pub fn sample<I>(&mut self, state: &AppState<I>, now: I) -> u64
    where
        I: Copy + Sub<Output = Duration>,
    {
        self.remaining = remaining_secs(state.lock_anchor(), state.lock_duration_minutes(), now);
        self.remaining
    }

    /// Last sampled value.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining
    }
}
