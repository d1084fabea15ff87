//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - Operator interactions (keyboard) and the cooldown tick.
//! - Link and collaborator notifications reported by the runtime.

use snackgate_proto::Command;

use crate::{Intent, KeyInput};

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Operator intent from a frontend without key bindings.
    Intent(Intent),

    /// Cooldown sampling tick.
    Tick,

    /// Link capability is absent on this platform.
    PlatformUnsupported,

    /// Link opened.
    Connected {
        /// Name of the opened port.
        port: String,
    },

    /// Link could not be opened.
    ConnectFailed {
        /// Error description.
        reason: String,
    },

    /// Link closed. `reason` is `None` for an operator-initiated disconnect.
    Disconnected {
        /// Error description.
        reason: Option<String>,
    },

    /// A command was written to the link.
    Sent(Command),

    /// Raw bytes read from the link.
    BytesReceived(Vec<u8>),

    /// Insight service produced a tip.
    InsightReady(String),

    /// Insight service failed.
    InsightFailed {
        /// Error description.
        reason: String,
    },
}
