//! Application layer for the snack gate console
//!
//! Pure state machines and a generic runtime for the operator UI and the
//! device link, so deterministic simulation tests run the same orchestration
//! code as the terminal frontend.
//!
//! # Components
//!
//! - [`App`]: UI state machine (operator intents, inbound bytes, history)
//! - [`Transport`] / [`Connector`]: the device link seam
//! - [`InsightService`]: optional advisory collaborator
//! - [`Driver`]: trait for platform-specific input and rendering
//! - [`Runtime`]: generic orchestration loop using Driver and Connector

#![forbid(unsafe_code)]

mod action;
mod app;
mod config;
mod driver;
mod event;
mod input;
mod insight;
mod runtime;
mod session;
mod transport;

pub use action::AppAction;
pub use app::App;
pub use config::{DEFAULT_LOCK_MINUTES, SessionConfig};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{Intent, KeyInput};
pub use insight::{FALLBACK_INSIGHT, InsightError, InsightRequest, InsightService, RuleOfThumb, Unconfigured};
pub use runtime::Runtime;
pub use session::{ConnectionState, Session};
pub use transport::{ConnectionError, Connector, OpenError, SelectionError, Transport};
