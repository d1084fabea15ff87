//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use snackgate_proto::Command;

use crate::InsightRequest;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Open a link to the device.
    Connect,

    /// Tear down the current link.
    Disconnect,

    /// Write a command to the device.
    Send(Command),

    /// Ask the insight service for a tip.
    RequestInsight(InsightRequest),
}
