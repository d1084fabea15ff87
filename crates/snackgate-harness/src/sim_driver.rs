//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`snackgate_app::Runtime`] orchestration code runs in both production and
//! simulation. The paired [`SimOperator`] stays with the test: it injects
//! operator events and observes rendered frames.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use snackgate_app::{App, AppEvent, Driver, Intent, KeyInput};
use snackgate_core::Environment;
use tokio::sync::{mpsc, watch};

use crate::{AppSnapshot, InvariantRegistry};

/// How long [`SimOperator::wait_for`] waits before giving up.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    frames: watch::Sender<AppSnapshot>,
    rendered: u64,
    invariants: Option<InvariantRegistry>,
    stopped: Arc<AtomicBool>,
}

/// Test-side handle paired with a [`SimDriver`].
///
/// Dropping the operator makes the driver report a quit.
#[derive(Clone)]
pub struct SimOperator {
    events: mpsc::UnboundedSender<AppEvent>,
    frames: watch::Receiver<AppSnapshot>,
    stopped: Arc<AtomicBool>,
}

impl SimDriver {
    /// Create a driver and its operator handle.
    pub fn new() -> (Self, SimOperator) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (frames_tx, frames_rx) = watch::channel(AppSnapshot::default());
        let stopped = Arc::new(AtomicBool::new(false));

        let driver = Self {
            events: events_rx,
            frames: frames_tx,
            rendered: 0,
            invariants: None,
            stopped: Arc::clone(&stopped),
        };
        let operator = SimOperator { events: events_tx, frames: frames_rx, stopped };
        (driver, operator)
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let event = self.events.recv().await.unwrap_or(AppEvent::Intent(Intent::Quit));
        Ok(Some(event))
    }

    fn render<E: Environment>(&mut self, app: &App<E>) -> Result<(), Self::Error> {
        self.rendered += 1;
        let snapshot = AppSnapshot::from_app(app, self.rendered);

        if let Some(registry) = &self.invariants
            && let Err(violations) = registry.check_all(&snapshot)
        {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            return Err(SimDriverError(format!("invariant violation at frame {}: {}", self.rendered, messages.join("; "))));
        }

        self.frames.send_replace(snapshot);
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

impl SimOperator {
    /// Inject an operator intent.
    pub fn intent(&self, intent: Intent) {
        let _ = self.events.send(AppEvent::Intent(intent));
    }

    /// Inject a key press.
    pub fn key(&self, key: KeyInput) {
        let _ = self.events.send(AppEvent::Key(key));
    }

    /// Latest rendered frame.
    pub fn latest(&self) -> AppSnapshot {
        self.frames.borrow().clone()
    }

    /// Wait until a rendered frame satisfies `predicate`.
    ///
    /// Returns `None` on timeout or when the runtime has gone away.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&AppSnapshot) -> bool) -> Option<AppSnapshot> {
        let waited = tokio::time::timeout(DEFAULT_WAIT, self.frames.wait_for(predicate)).await;
        match waited {
            Ok(Ok(snapshot)) => Some(snapshot.clone()),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    /// Whether the driver was stopped by the runtime.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
