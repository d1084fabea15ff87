//! Invariant checking for deterministic simulation testing.
//!
//! Invariants are properties that must always hold during execution. Unlike
//! example-based tests that check specific scenarios, they are checked
//! against every frame the App renders.
//!
//! # Architecture
//!
//! Observable state is extracted from the App into an [`AppSnapshot`], then
//! every registered [`Invariant`] runs against it.

use snackgate_app::{App, ConnectionState};
use snackgate_core::{Environment, Mode};

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// Observable App state at one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    /// Render sequence number, starting at 1.
    pub frame: u64,
    /// Connection state.
    pub connection: ConnectionState,
    /// Operating mode.
    pub mode: Mode,
    /// Visits in the current period.
    pub count: u32,
    /// Visit quota.
    pub limit: u32,
    /// Gate locked.
    pub is_locked: bool,
    /// Whether a lockout episode is running.
    pub anchored: bool,
    /// Lockout length in minutes.
    pub lock_duration_minutes: u32,
    /// Seconds left in the lockout.
    pub cooldown_remaining_secs: u64,
    /// Visit counts recorded in history, newest first.
    pub visits: Vec<u32>,
    /// Ids of the recorded visits, in the same order.
    pub visit_ids: Vec<u64>,
    /// Diagnostic lines, newest first.
    pub log: Vec<String>,
    /// Status message.
    pub status: Option<String>,
    /// Insight text.
    pub insight: Option<String>,
    /// Visit history capacity.
    pub visit_capacity: usize,
    /// Log capacity.
    pub log_capacity: usize,
}

impl AppSnapshot {
    /// Extract the observable state of `app`.
    pub fn from_app<E: Environment>(app: &App<E>, frame: u64) -> Self {
        let state = app.state();
        Self {
            frame,
            connection: app.connection_state().clone(),
            mode: state.mode(),
            count: state.count(),
            limit: state.limit().get(),
            is_locked: state.is_locked(),
            anchored: state.lock_anchor().is_some(),
            lock_duration_minutes: state.lock_duration_minutes(),
            cooldown_remaining_secs: app.cooldown_remaining_secs(),
            visits: app.visits().map(|v| v.count_at_visit).collect(),
            visit_ids: app.visits().map(|v| v.id).collect(),
            log: app.log_entries().map(|e| e.text.clone()).collect(),
            status: app.status_message().map(str::to_owned),
            insight: app.insight().map(str::to_owned),
            visit_capacity: app.config().visit_capacity,
            log_capacity: app.config().log_capacity,
        }
    }

    /// Whether a line with exactly this text is in the log.
    pub fn logged(&self, text: &str) -> bool {
        self.log.iter().any(|line| line == text)
    }
}

/// An invariant that can be checked against App state.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant against a snapshot.
    fn check(&self, state: &AppSnapshot) -> InvariantResult;
}

/// Visits are listed newest first with strictly decreasing ids.
pub struct VisitsNewestFirst;

impl Invariant for VisitsNewestFirst {
    fn name(&self) -> &'static str {
        "visits_newest_first"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        match state.visit_ids.windows(2).find(|pair| pair[0] <= pair[1]) {
            None => Ok(()),
            Some(pair) => Err(Violation {
                invariant: self.name(),
                message: format!("visit {} listed before visit {}", pair[0], pair[1]),
            }),
        }
    }
}

/// A running lockout episode implies the gate is locked.
pub struct AnchorRequiresLock;

impl Invariant for AnchorRequiresLock {
    fn name(&self) -> &'static str {
        "anchor_requires_lock"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        if !state.anchored || state.is_locked {
            return Ok(());
        }
        Err(Violation { invariant: self.name(), message: "lock anchor set while unlocked".to_owned() })
    }
}

/// History never grows past its capacities.
pub struct HistoryBounded;

impl Invariant for HistoryBounded {
    fn name(&self) -> &'static str {
        "history_bounded"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        if state.visits.len() > state.visit_capacity {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} visits > capacity {}", state.visits.len(), state.visit_capacity),
            });
        }
        if state.log.len() > state.log_capacity {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} log lines > capacity {}", state.log.len(), state.log_capacity),
            });
        }
        Ok(())
    }
}

/// The countdown never exceeds the configured lockout length.
pub struct CooldownWithinDuration;

impl Invariant for CooldownWithinDuration {
    fn name(&self) -> &'static str {
        "cooldown_within_duration"
    }

    fn check(&self, state: &AppSnapshot) -> InvariantResult {
        let total = u64::from(state.lock_duration_minutes) * 60;
        if state.cooldown_remaining_secs <= total {
            return Ok(());
        }
        Err(Violation {
            invariant: self.name(),
            message: format!("remaining {}s > duration {total}s", state.cooldown_remaining_secs),
        })
    }
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the standard gate invariants.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(VisitsNewestFirst);
        registry.add(AnchorRequiresLock);
        registry.add(HistoryBounded);
        registry.add(CooldownWithinDuration);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants against the given state.
    ///
    /// Returns `Ok(())` if all invariants hold, or all violations found.
    pub fn check_all(&self, state: &AppSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> = self.invariants.iter().filter_map(|inv| inv.check(state).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AppSnapshot {
        AppSnapshot { limit: 5, visit_capacity: 20, log_capacity: 40, ..AppSnapshot::default() }
    }

    #[test]
    fn standard_registry_has_invariants() {
        let registry = InvariantRegistry::standard();
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn fresh_snapshot_passes() {
        assert!(InvariantRegistry::standard().check_all(&snapshot()).is_ok());
    }

    #[test]
    fn misordered_visits_are_reported() {
        let state = AppSnapshot { visits: vec![1, 2], visit_ids: vec![1, 2], ..snapshot() };
        let violations = InvariantRegistry::standard().check_all(&state).err().unwrap_or_default();

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].invariant, "visits_newest_first");
    }

    #[test]
    fn lowered_limit_is_not_a_violation() {
        // Count is only re-derived by the next reading
        let state = AppSnapshot { count: 5, limit: 3, ..snapshot() };
        assert!(InvariantRegistry::standard().check_all(&state).is_ok());
    }

    #[test]
    fn anchor_without_lock_is_reported() {
        let state = AppSnapshot { anchored: true, ..snapshot() };
        assert!(AnchorRequiresLock.check(&state).is_err());
    }
}
