//! State reconciliation.
//!
//! [`apply`] is the pure reducer that folds one [`DomainEvent`] into an
//! [`AppState`]. [`Reconciler`] owns the live state, runs the reducer, and
//! reports the side effects observers care about (visits, lockout start and
//! end) as [`StateChange`] values, in the same action style the rest of the
//! workspace uses: methods take time as input and return what happened.
//!
//! # Transitions
//!
//! ```text
//! RemainingCount(r)  count = max(0, limit - r)
//!                    r == 0: locked, anchor = now if unset
//!                    r >  0: unlocked, anchor cleared
//! Locked             locked, anchor = now if unset
//! Unlocked           unlocked, count = 0, anchor cleared
//! ModeChanged(m)     mode = m
//! Unrecognized       no change
//! ```

use std::num::NonZeroU32;

use snackgate_proto::DomainEvent;

use crate::state::AppState;

/// Observable side effect of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// `count` strictly increased. Carries the new count.
    VisitCounted {
        /// Count after the event.
        count: u32,
    },
    /// A lockout episode began (anchor went from unset to set).
    LockoutStarted,
    /// A lockout episode ended (anchor went from set to unset).
    LockoutEnded,
}

/// Apply one event to `state`, returning the next state.
///
/// The visit count is derived from the `limit` stored in `state` at the moment
/// of the call, so a limit applied earlier is always honoured.
pub fn apply<I: Copy>(state: &AppState<I>, event: &DomainEvent, now: I) -> AppState<I> {
    let mut next = state.clone();

    match event {
        DomainEvent::RemainingCount(remaining) => {
            next.count = state.limit.get().saturating_sub(*remaining);
            if *remaining == 0 {
                next.is_locked = true;
                next.lock_anchor.get_or_insert(now);
            } else {
                next.is_locked = false;
                next.lock_anchor = None;
            }
        },
        DomainEvent::Locked => {
            next.is_locked = true;
            next.lock_anchor.get_or_insert(now);
        },
        DomainEvent::Unlocked => {
            next.is_locked = false;
            next.count = 0;
            next.lock_anchor = None;
        },
        DomainEvent::ModeChanged(mode) => {
            next.mode = *mode;
        },
        DomainEvent::Unrecognized(_) => {},
    }

    next
}

/// Owner of the authoritative [`AppState`].
///
/// Single writer: inbound events and local configuration changes are both
/// applied through `&mut self`, so every event sees the configuration in
/// effect at the moment it is processed.
#[derive(Debug, Clone)]
pub struct Reconciler<I> {
    state: AppState<I>,
}

impl<I: Copy> Reconciler<I> {
    /// Start reconciling from `state`.
    pub fn new(state: AppState<I>) -> Self {
        Self { state }
    }

    /// Apply an event and report the side effects.
    pub fn handle(&mut self, event: &DomainEvent, now: I) -> Vec<StateChange> {
        let next = apply(&self.state, event, now);
        let changes = diff(&self.state, &next);
        self.state = next;
        changes
    }

    /// Replace the visit quota. Takes effect for the next event handled.
    pub fn apply_limit(&mut self, limit: NonZeroU32) {
        self.state.limit = limit;
    }

    /// Replace the lockout length. Does not touch the lock anchor.
    pub fn apply_lock_duration(&mut self, minutes: u32) {
        self.state.lock_duration_minutes = minutes;
    }

    /// Current state.
    pub fn state(&self) -> &AppState<I> {
        &self.state
    }
}

fn diff<I>(prev: &AppState<I>, next: &AppState<I>) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if next.count > prev.count {
        changes.push(StateChange::VisitCounted { count: next.count });
    }

    match (prev.lock_anchor.is_some(), next.lock_anchor.is_some()) {
        (false, true) => changes.push(StateChange::LockoutStarted),
        (true, false) => changes.push(StateChange::LockoutEnded),
        _ => {},
    }

    changes
}
