//! Terminal console for the snack gate
//!
//! A thin shell over [`snackgate_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`snackgate_app::Runtime`].
//!
//! This crate only handles terminal input, rendering and the production
//! clock.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod system_env;
pub mod terminal;
pub mod ui;

pub use snackgate_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
