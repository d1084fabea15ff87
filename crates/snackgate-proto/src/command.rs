//! Outbound command encoding.
//!
//! Commands are fire-and-forget: the device sends no acknowledgment, so the
//! encoder only terminates the text. It performs no semantic validation.

use std::fmt;

use crate::message::Mode;

/// Terminator appended to every outbound command.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Commands understood by the gate firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to automatic dispensing.
    Auto,
    /// Switch to manual dispensing.
    Manual,
    /// Switch to quota-enforced operation.
    Normal,
    /// Dispense once.
    Open,
    /// Release the lockout.
    Unlock,
    /// Set the visit quota.
    Limit(u32),
    /// Set the lockout duration in minutes.
    LockTime(u32),
    /// Arbitrary text, sent verbatim.
    Raw(String),
}

impl Command {
    /// The mode-switch command for `mode`.
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Auto => Command::Auto,
            Mode::Manual => Command::Manual,
            Mode::Normal => Command::Normal,
        }
    }

    /// Mode selected by this command, if it is a mode switch.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Command::Auto => Some(Mode::Auto),
            Command::Manual => Some(Mode::Manual),
            Command::Normal => Some(Mode::Normal),
            Command::Open
            | Command::Unlock
            | Command::Limit(_)
            | Command::LockTime(_)
            | Command::Raw(_) => None,
        }
    }

    /// Serialize to wire bytes, terminator included.
    pub fn encode(&self) -> Vec<u8> {
        encode(&self.to_string())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Auto => f.write_str("AUTO"),
            Command::Manual => f.write_str("MANUAL"),
            Command::Normal => f.write_str("NORMAL"),
            Command::Open => f.write_str("OPEN"),
            Command::Unlock => f.write_str("UNLOCK"),
            Command::Limit(n) => write!(f, "LIMIT {n}"),
            Command::LockTime(minutes) => write!(f, "LOCKTIME {minutes}"),
            Command::Raw(text) => f.write_str(text),
        }
    }
}

/// Terminate arbitrary command text for the wire.
pub fn encode(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(command.len() + 1);
    bytes.extend_from_slice(command.as_bytes());
    bytes.push(LINE_TERMINATOR);
    bytes
}
