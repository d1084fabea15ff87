//! Terminal-agnostic keyboard input and operator intents.

use snackgate_proto::Command;

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key (quit).
    Esc,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
}

/// Operator intent, independent of how it was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open a link to the device.
    Connect,
    /// Close the current link.
    Disconnect,
    /// Send a command as-is.
    Send(Command),
    /// Apply a new visit quota.
    ApplyLimit(u32),
    /// Apply a new lockout length in minutes.
    ApplyLockDuration(u32),
    /// Step the limit draft by the given amount.
    AdjustDraftLimit(i32),
    /// Step the lockout draft by the given amount.
    AdjustDraftLockDuration(i32),
    /// Apply the limit draft.
    ApplyDraftLimit,
    /// Apply the lockout draft.
    ApplyDraftLockDuration,
    /// Clear history and insight from the display.
    ResetDisplay,
    /// Ask the insight service for a tip.
    RequestInsight,
    /// Leave the application.
    Quit,
}

impl Intent {
    /// Key binding table. Unbound keys map to `None`.
    pub fn from_key(key: KeyInput) -> Option<Self> {
        let intent = match key {
            KeyInput::Esc | KeyInput::Char('q') => Self::Quit,
            KeyInput::Char('c') => Self::Connect,
            KeyInput::Char('d') => Self::Disconnect,
            KeyInput::Char('a') => Self::Send(Command::Auto),
            KeyInput::Char('m') => Self::Send(Command::Manual),
            KeyInput::Char('n') => Self::Send(Command::Normal),
            KeyInput::Char('o') => Self::Send(Command::Open),
            KeyInput::Char('u') => Self::Send(Command::Unlock),
            KeyInput::Char('+') | KeyInput::Up => Self::AdjustDraftLimit(1),
            KeyInput::Char('-') | KeyInput::Down => Self::AdjustDraftLimit(-1),
            KeyInput::Char('>') | KeyInput::Right => Self::AdjustDraftLockDuration(1),
            KeyInput::Char('<') | KeyInput::Left => Self::AdjustDraftLockDuration(-1),
            KeyInput::Char('l') | KeyInput::Enter => Self::ApplyDraftLimit,
            KeyInput::Char('t') => Self::ApplyDraftLockDuration,
            KeyInput::Char('r') => Self::ResetDisplay,
            KeyInput::Char('i') => Self::RequestInsight,
            KeyInput::Char(_) => return None,
        };
        Some(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_keys_send_mode_commands() {
        assert_eq!(Intent::from_key(KeyInput::Char('a')), Some(Intent::Send(Command::Auto)));
        assert_eq!(Intent::from_key(KeyInput::Char('m')), Some(Intent::Send(Command::Manual)));
        assert_eq!(Intent::from_key(KeyInput::Char('n')), Some(Intent::Send(Command::Normal)));
    }

    #[test]
    fn quit_on_q_and_escape() {
        assert_eq!(Intent::from_key(KeyInput::Esc), Some(Intent::Quit));
        assert_eq!(Intent::from_key(KeyInput::Char('q')), Some(Intent::Quit));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(Intent::from_key(KeyInput::Char('z')), None);
        assert_eq!(Intent::from_key(KeyInput::Char('7')), None);
    }
}
