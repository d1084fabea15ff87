//! Deterministic simulation harness for the snack gate console.
//!
//! Simulated implementations of the Environment, Connector/Transport and
//! Driver traits, so the production [`snackgate_app::Runtime`] runs against
//! a scripted operator and a scripted device under a virtual clock.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties of every rendered
//! frame. Use [`InvariantRegistry::standard()`] for the common gate
//! invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_link;

pub use invariants::{
    AnchorRequiresLock, AppSnapshot, CooldownWithinDuration, HistoryBounded, Invariant, InvariantRegistry,
    InvariantResult, Violation, VisitsNewestFirst,
};
pub use sim_driver::{SimDriver, SimDriverError, SimOperator};
pub use sim_env::SimEnv;
pub use sim_link::{SimConnector, SimDevice, SimTransport};
