//! Inbound message interpretation.
//!
//! Maps one framed text line to a [`DomainEvent`]. Rules are checked in order:
//!
//! 1. `REMAINING:<int>` becomes [`DomainEvent::RemainingCount`], or
//!    [`DomainEvent::Unrecognized`] when the payload is not an integer.
//! 2. `LOCKED` becomes [`DomainEvent::Locked`].
//! 3. `UNLOCKED` or `AUTO UNLOCKED` becomes [`DomainEvent::Unlocked`].
//! 4. Anything else becomes [`DomainEvent::Unrecognized`].

use std::fmt;

use crate::errors::{ProtocolError, Result};

const REMAINING_PREFIX: &str = "REMAINING:";

/// Dispensing mode of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Device dispenses on its own schedule.
    Auto,
    /// Device dispenses only on an explicit OPEN.
    Manual,
    /// Quota-enforced operation.
    #[default]
    Normal,
}

impl Mode {
    /// Wire spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "AUTO",
            Mode::Manual => "MANUAL",
            Mode::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed representation of one protocol message.
///
/// Produced by [`DomainEvent::parse`] for inbound lines, or constructed
/// locally for [`DomainEvent::ModeChanged`] when the operator switches mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// Visits left before the quota is exhausted.
    RemainingCount(u32),
    /// Gate locked.
    Locked,
    /// Gate released.
    Unlocked,
    /// Operating mode switched.
    ModeChanged(Mode),
    /// Text that drives no state transition. Logged only.
    Unrecognized(String),
}

impl DomainEvent {
    /// Interpret a framed line.
    pub fn parse(line: &str) -> Self {
        if line.starts_with(REMAINING_PREFIX) {
            return match parse_remaining(line) {
                Ok(remaining) => DomainEvent::RemainingCount(remaining),
                Err(_) => DomainEvent::Unrecognized(line.to_owned()),
            };
        }

        match line {
            "LOCKED" => DomainEvent::Locked,
            "UNLOCKED" | "AUTO UNLOCKED" => DomainEvent::Unlocked,
            _ => DomainEvent::Unrecognized(line.to_owned()),
        }
    }

    /// True if this event can change application state.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, DomainEvent::Unrecognized(_))
    }
}

/// Extract the count from a `REMAINING:<int>` line.
///
/// Surrounding whitespace in the payload is tolerated. Signs, fractions and
/// values above `u32::MAX` are rejected.
///
/// # Errors
///
/// - `ProtocolError::InvalidRemaining` if the line lacks the prefix or the
///   payload is not a non-negative integer
pub fn parse_remaining(line: &str) -> Result<u32> {
    let invalid = || ProtocolError::InvalidRemaining { raw: line.to_owned() };

    let payload = line.strip_prefix(REMAINING_PREFIX).ok_or_else(invalid)?.trim();
    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    payload.parse::<u32>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_count() {
        assert_eq!(DomainEvent::parse("REMAINING:3"), DomainEvent::RemainingCount(3));
        assert_eq!(DomainEvent::parse("REMAINING:0"), DomainEvent::RemainingCount(0));
        assert_eq!(DomainEvent::parse("REMAINING: 12"), DomainEvent::RemainingCount(12));
    }

    #[test]
    fn malformed_remaining_is_unrecognized() {
        for raw in ["REMAINING:abc", "REMAINING:", "REMAINING:-1", "REMAINING:+2", "REMAINING:1.5"] {
            assert_eq!(DomainEvent::parse(raw), DomainEvent::Unrecognized(raw.to_owned()));
        }
    }

    #[test]
    fn remaining_overflow_rejected() {
        let raw = "REMAINING:99999999999";
        assert!(matches!(parse_remaining(raw), Err(ProtocolError::InvalidRemaining { .. })));
        assert_eq!(DomainEvent::parse(raw), DomainEvent::Unrecognized(raw.to_owned()));
    }

    #[test]
    fn lock_signals() {
        assert_eq!(DomainEvent::parse("LOCKED"), DomainEvent::Locked);
        assert_eq!(DomainEvent::parse("UNLOCKED"), DomainEvent::Unlocked);
        assert_eq!(DomainEvent::parse("AUTO UNLOCKED"), DomainEvent::Unlocked);
    }

    #[test]
    fn lock_signals_match_exactly() {
        assert!(!DomainEvent::parse("LOCKED!").is_recognized());
        assert!(!DomainEvent::parse("locked").is_recognized());
        assert!(!DomainEvent::parse("AUTO").is_recognized());
    }

    #[test]
    fn mode_wire_spelling() {
        assert_eq!(Mode::Auto.to_string(), "AUTO");
        assert_eq!(Mode::Manual.to_string(), "MANUAL");
        assert_eq!(Mode::Normal.as_str(), "NORMAL");
    }
}
