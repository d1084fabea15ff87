//! Authoritative application state.

use std::num::NonZeroU32;

use snackgate_proto::Mode;

use crate::error::ConfigError;

/// Visit quota used until the operator applies another.
pub const DEFAULT_LIMIT: NonZeroU32 = NonZeroU32::MIN.saturating_add(4);

/// Snapshot of everything the gate link knows about the device.
///
/// Generic over `I` (the instant type) so the lock anchor can be real or
/// virtual time.
///
/// # Invariants
///
/// - `limit >= 1` (enforced by `NonZeroU32`)
/// - `lock_anchor` is `Some` exactly for the duration of one lockout episode
///   and keeps the instant that episode started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState<I> {
    pub(crate) mode: Mode,
    pub(crate) is_locked: bool,
    pub(crate) count: u32,
    pub(crate) limit: NonZeroU32,
    pub(crate) lock_duration_minutes: u32,
    pub(crate) lock_anchor: Option<I>,
}

impl<I> AppState<I> {
    /// Unlocked state with zero visits.
    pub fn new(limit: NonZeroU32, lock_duration_minutes: u32) -> Self {
        Self {
            mode: Mode::default(),
            is_locked: false,
            count: 0,
            limit,
            lock_duration_minutes,
            lock_anchor: None,
        }
    }

    /// Like [`AppState::new`] but validating a raw limit.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidLimit` if `limit` is zero
    pub fn try_new(limit: u32, lock_duration_minutes: u32) -> Result<Self, ConfigError> {
        let limit = NonZeroU32::new(limit).ok_or(ConfigError::InvalidLimit(limit))?;
        Ok(Self::new(limit, lock_duration_minutes))
    }

    /// Current operating mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the gate is locked.
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Visits counted against the quota.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Configured visit quota.
    pub fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    /// Configured lockout length in minutes. Zero disables the countdown.
    pub fn lock_duration_minutes(&self) -> u32 {
        self.lock_duration_minutes
    }
}

impl<I: Copy> AppState<I> {
    /// Start of the current lockout episode. `None` when not locked out.
    pub fn lock_anchor(&self) -> Option<I> {
        self.lock_anchor
    }
}

impl<I> Default for AppState<I> {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}
