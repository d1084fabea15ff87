//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The device link is owned by the
//! runtime, not the driver.

use std::io::{self, Stdout, stdout};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use snackgate_app::{App, AppEvent, Driver, Intent, KeyInput};
use snackgate_core::Environment;
use thiserror::Error;

use crate::ui;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Enters raw mode and the alternate screen on creation and restores the
/// terminal on [`Driver::stop`] or drop, whichever comes first.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    /// Raw mode and the alternate screen are active.
    active: bool,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, active: true })
    }

    fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to leave raw mode: {e}");
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            tracing::warn!("Failed to leave alternate screen: {e}");
        }
        if let Err(e) = self.terminal.show_cursor() {
            tracing::warn!("Failed to show cursor: {e}");
        }
    }
}

/// Convert crossterm `KeyCode` to `KeyInput`.
fn convert_key(code: KeyCode) -> Option<KeyInput> {
    match code {
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        KeyCode::Enter => Some(KeyInput::Enter),
        KeyCode::Esc => Some(KeyInput::Esc),
        KeyCode::Left => Some(KeyInput::Left),
        KeyCode::Right => Some(KeyInput::Right),
        KeyCode::Up => Some(KeyInput::Up),
        KeyCode::Down => Some(KeyInput::Down),
        _ => None,
    }
}

/// Convert a terminal event into an App event, if it means anything.
fn convert_event(event: &Event) -> Option<AppEvent> {
    match event {
        Event::Key(KeyEvent { kind: KeyEventKind::Press, code, modifiers, .. }) => {
            if modifiers.contains(KeyModifiers::CONTROL) {
                return matches!(code, KeyCode::Char('c')).then_some(AppEvent::Intent(Intent::Quit));
            }
            convert_key(*code).map(AppEvent::Key)
        },
        // Redraw at the new size
        Event::Resize(..) => Some(AppEvent::Tick),
        _ => None,
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        match self.event_stream.next().await {
            Some(Ok(event)) => Ok(convert_event(&event)),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            None => {
                tracing::info!("Terminal input closed");
                Ok(Some(AppEvent::Intent(Intent::Quit)))
            },
        }
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.restore();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.restore();
    }
}
