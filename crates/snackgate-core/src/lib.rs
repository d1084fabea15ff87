//! Snack gate core
//!
//! Pure state machines that fold device events into the authoritative
//! application state. Nothing here performs I/O or reads a clock directly:
//! time is passed in as a parameter, so the same code runs under a real clock
//! in production and a manually advanced clock in tests.
//!
//! # Components
//!
//! - [`AppState`]: the authoritative snapshot (mode, lock, count, quota)
//! - [`apply`]: pure reducer `(state, event, now) -> state`
//! - [`Reconciler`]: owns the state, applies events and local configuration,
//!   reports side effects as [`StateChange`]s
//! - [`CooldownClock`]: remaining lockout time derived from the lock anchor
//! - [`HistoryLog`]: bounded newest-first visit and diagnostic logs
//! - [`Environment`]: time source abstraction

#![forbid(unsafe_code)]

pub mod cooldown;
pub mod env;
pub mod error;
pub mod history;
pub mod reconciler;
pub mod state;

pub use cooldown::{CooldownClock, DEFAULT_TICK_PERIOD, remaining_secs};
pub use env::Environment;
pub use error::ConfigError;
pub use history::{
    DEFAULT_LOG_CAPACITY, DEFAULT_VISIT_CAPACITY, HistoryLog, LogEntry, VisitRecord,
};
pub use reconciler::{Reconciler, StateChange, apply};
pub use snackgate_proto::{DomainEvent, Mode};
pub use state::{AppState, DEFAULT_LIMIT};
