//! Driver trait for abstracting operator I/O.
//!
//! The [`Driver`] trait decouples the application runtime from specific
//! frontends. Each frontend implements the trait to provide input and
//! rendering, while the generic [`crate::Runtime`] handles all orchestration,
//! including the device link.

use std::future::Future;

use snackgate_core::Environment;

use crate::{App, AppEvent};

/// Abstracts operator I/O for the application runtime.
///
/// # Implementations
///
/// - **TUI**: crossterm event stream and ratatui rendering
/// - **Simulation**: scripted intents and captured frames
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next operator event.
    ///
    /// Returns `None` when the input produced nothing of interest (for
    /// example a mouse event). Must be cancel-safe: the runtime drops the
    /// future whenever another source wins the select.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error>;

    /// Restore the frontend and release resources.
    fn stop(&mut self);
}
