//! Application state machine.
//!
//! This module defines the [`App`] state machine, the view model of the
//! console, completely decoupled from terminal and link I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Frames inbound bytes and reconciles the gate state from the lines.
//! - Records visits and diagnostic lines in the bounded history.
//! - Turns operator intents into device commands and local state changes.
//! - Tracks connection state, the cooldown, drafts and status feedback.

use std::num::NonZeroU32;

use snackgate_core::{
    AppState, ConfigError, CooldownClock, DomainEvent, Environment, HistoryLog, LogEntry, Reconciler, StateChange,
    VisitRecord,
};
use snackgate_proto::Command;

use crate::{
    AppAction, AppEvent, ConnectionState, FALLBACK_INSIGHT, InsightRequest, Intent, Session, SessionConfig,
};

/// Diagnostic lines handed to the insight service.
const INSIGHT_LOG_LINES: usize = 10;

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
pub struct App<E: Environment> {
    env: E,
    config: SessionConfig,
    /// Connection state.
    connection: ConnectionState,
    /// Open link. `None` while disconnected.
    session: Option<Session>,
    reconciler: Reconciler<E::Instant>,
    cooldown: CooldownClock,
    history: HistoryLog,
    draft_limit: u32,
    draft_lock_minutes: u32,
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
    /// Last insight text. `None` until one is requested.
    insight: Option<String>,
    insight_pending: bool,
}

impl<E: Environment> App<E> {
    /// Create an App with the given environment and configuration.
    pub fn new(env: E, config: SessionConfig) -> Self {
        let state = AppState::new(config.initial_limit, config.initial_lock_minutes);
        Self {
            env,
            connection: ConnectionState::Disconnected,
            session: None,
            reconciler: Reconciler::new(state),
            cooldown: CooldownClock::new(config.cooldown_period),
            history: HistoryLog::new(config.visit_capacity, config.log_capacity),
            draft_limit: config.initial_limit.get(),
            draft_lock_minutes: config.initial_lock_minutes,
            status_message: None,
            insight: None,
            insight_pending: false,
            config,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => match Intent::from_key(key) {
                Some(intent) => self.perform(intent),
                None => vec![],
            },
            AppEvent::Intent(intent) => self.perform(intent),
            AppEvent::Tick => {
                let now = self.env.now();
                self.cooldown.sample(self.reconciler.state(), now);
                vec![AppAction::Render]
            },
            AppEvent::PlatformUnsupported => {
                self.connection = ConnectionState::Unsupported;
                self.session = None;
                vec![AppAction::Render]
            },
            AppEvent::Connected { port } => {
                self.session = Some(Session::new(port.clone()));
                self.note(format!("connected to {port}"));
                self.status_message = Some(format!("Connected to {port}"));
                self.connection = ConnectionState::Connected { port };
                vec![AppAction::Render]
            },
            AppEvent::ConnectFailed { reason } => {
                self.connection = ConnectionState::Disconnected;
                self.note(format!("connect failed: {reason}"));
                self.status_message = Some(format!("Connect failed: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::Disconnected { reason } => {
                self.session = None;
                if !self.is_unsupported() {
                    self.connection = ConnectionState::Disconnected;
                }
                match reason {
                    Some(reason) => {
                        self.note(format!("disconnected: {reason}"));
                        self.status_message = Some(format!("Link lost: {reason}"));
                    },
                    None => {
                        self.note("disconnected");
                        self.status_message = Some("Disconnected".to_owned());
                    },
                }
                vec![AppAction::Render]
            },
            AppEvent::Sent(command) => self.confirm_sent(&command),
            AppEvent::BytesReceived(bytes) => self.receive(&bytes),
            AppEvent::InsightReady(text) => {
                self.insight_pending = false;
                self.insight = Some(text);
                vec![AppAction::Render]
            },
            AppEvent::InsightFailed { reason } => {
                self.insight_pending = false;
                self.insight = Some(FALLBACK_INSIGHT.to_owned());
                self.status_message = Some(format!("Insight unavailable: {reason}"));
                vec![AppAction::Render]
            },
        }
    }

    /// Carry out an operator intent.
    pub fn perform(&mut self, intent: Intent) -> Vec<AppAction> {
        match intent {
            Intent::Connect => self.connect(),
            Intent::Disconnect => self.disconnect(),
            Intent::Send(command) => self.send_command(command),
            Intent::ApplyLimit(limit) => self.apply_limit(limit),
            Intent::ApplyLockDuration(minutes) => self.apply_lock_duration(minutes),
            Intent::AdjustDraftLimit(delta) => {
                if self.is_unsupported() {
                    return vec![];
                }
                self.draft_limit = self.draft_limit.saturating_add_signed(delta).max(1);
                vec![AppAction::Render]
            },
            Intent::AdjustDraftLockDuration(delta) => {
                if self.is_unsupported() {
                    return vec![];
                }
                self.draft_lock_minutes = self.draft_lock_minutes.saturating_add_signed(delta);
                vec![AppAction::Render]
            },
            Intent::ApplyDraftLimit => self.apply_limit(self.draft_limit),
            Intent::ApplyDraftLockDuration => self.apply_lock_duration(self.draft_lock_minutes),
            Intent::ResetDisplay => self.reset_display(),
            Intent::RequestInsight => self.request_insight(),
            Intent::Quit => self.quit(),
        }
    }

    /// Open a link to the device.
    pub fn connect(&mut self) -> Vec<AppAction> {
        match self.connection {
            ConnectionState::Unsupported => vec![],
            ConnectionState::Connecting | ConnectionState::Connected { .. } => {
                self.status_message = Some("Already connected".to_owned());
                vec![AppAction::Render]
            },
            ConnectionState::Disconnected => {
                self.connection = ConnectionState::Connecting;
                self.status_message = Some("Connecting...".to_owned());
                vec![AppAction::Connect, AppAction::Render]
            },
        }
    }

    /// Close the current link, or abandon a connect still in progress.
    pub fn disconnect(&mut self) -> Vec<AppAction> {
        if self.is_unsupported() {
            return vec![];
        }
        if self.connection == ConnectionState::Connecting {
            self.status_message = Some("Cancelling connect...".to_owned());
            return vec![AppAction::Disconnect, AppAction::Render];
        }
        if self.session.is_none() {
            self.status_message = Some("Not connected".to_owned());
            return vec![AppAction::Render];
        }
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Write `command` to the device.
    ///
    /// Rejected with a status message while disconnected. Mode commands
    /// change the local mode only once the write is confirmed with
    /// [`AppEvent::Sent`].
    pub fn send_command(&mut self, command: Command) -> Vec<AppAction> {
        if self.is_unsupported() {
            return vec![];
        }
        if self.session.is_none() {
            self.note(format!("not connected, dropped {command}"));
            self.status_message = Some(format!("Not connected: {command} not sent"));
            return vec![AppAction::Render];
        }

        self.note(format!("> {command}"));
        vec![AppAction::Send(command), AppAction::Render]
    }

    fn confirm_sent(&mut self, command: &Command) -> Vec<AppAction> {
        match command.mode() {
            Some(mode) if self.session.is_some() => {
                self.reconcile(&DomainEvent::ModeChanged(mode));
                vec![AppAction::Render]
            },
            _ => vec![],
        }
    }

    /// Apply a new visit quota locally and send `LIMIT n`.
    pub fn apply_limit(&mut self, limit: u32) -> Vec<AppAction> {
        if self.is_unsupported() {
            return vec![];
        }
        let Some(value) = NonZeroU32::new(limit) else {
            self.status_message = Some(ConfigError::InvalidLimit(limit).to_string());
            return vec![AppAction::Render];
        };

        self.reconciler.apply_limit(value);
        self.draft_limit = limit;
        self.note(format!("limit set to {limit}"));
        self.send_command(Command::Limit(limit))
    }

    /// Apply a new lockout length locally and send `LOCKTIME m`.
    pub fn apply_lock_duration(&mut self, minutes: u32) -> Vec<AppAction> {
        if self.is_unsupported() {
            return vec![];
        }
        self.reconciler.apply_lock_duration(minutes);
        self.draft_lock_minutes = minutes;
        let now = self.env.now();
        self.cooldown.sample(self.reconciler.state(), now);
        self.note(format!("lock duration set to {minutes} min"));
        self.send_command(Command::LockTime(minutes))
    }

    /// Clear visits, log lines and insight from the display. Gate state is
    /// untouched.
    pub fn reset_display(&mut self) -> Vec<AppAction> {
        if self.is_unsupported() {
            return vec![];
        }
        self.history.clear();
        self.insight = None;
        self.status_message = Some("Display cleared".to_owned());
        vec![AppAction::Render]
    }

    /// Ask the insight service for a tip. Ignored while a request is in
    /// flight.
    pub fn request_insight(&mut self) -> Vec<AppAction> {
        if self.is_unsupported() || self.insight_pending {
            return vec![];
        }
        self.insight_pending = true;
        self.status_message = Some("Asking for insight...".to_owned());

        let state = self.reconciler.state();
        let request = InsightRequest {
            count_today: state.count(),
            limit: state.limit().get(),
            lock_duration_minutes: state.lock_duration_minutes(),
            recent_log: self.history.recent_lines(INSIGHT_LOG_LINES),
        };
        vec![AppAction::RequestInsight(request), AppAction::Render]
    }

    /// Leave the application. Allowed on unsupported platforms.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn receive(&mut self, bytes: &[u8]) -> Vec<AppAction> {
        let Some(session) = self.session.as_mut() else {
            return vec![];
        };
        let lines = session.push(bytes);
        if lines.is_empty() {
            return vec![];
        }

        for line in lines {
            let event = DomainEvent::parse(&line);
            self.history.record(self.env.wall_clock_secs(), line);
            self.reconcile(&event);
        }
        vec![AppAction::Render]
    }

    fn reconcile(&mut self, event: &DomainEvent) {
        let now = self.env.now();
        for change in self.reconciler.handle(event, now) {
            match change {
                StateChange::VisitCounted { count } => {
                    self.history.record_visit(self.env.wall_clock_secs(), count);
                },
                StateChange::LockoutStarted => self.status_message = Some("Gate locked".to_owned()),
                StateChange::LockoutEnded => self.status_message = Some("Gate unlocked".to_owned()),
            }
        }
        self.cooldown.sample(self.reconciler.state(), now);
    }

    fn note(&mut self, text: impl Into<String>) {
        self.history.record(self.env.wall_clock_secs(), text);
    }

    /// Environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Configuration the App was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.connection
    }

    /// Whether the platform lacks link support.
    pub fn is_unsupported(&self) -> bool {
        self.connection == ConnectionState::Unsupported
    }

    /// Open session. `None` while disconnected.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Reconciled gate state.
    pub fn state(&self) -> &AppState<E::Instant> {
        self.reconciler.state()
    }

    /// Whether the cooldown tick should be running.
    pub fn cooldown_armed(&self) -> bool {
        CooldownClock::is_armed(self.reconciler.state())
    }

    /// Last sampled cooldown, in seconds.
    pub fn cooldown_remaining_secs(&self) -> u64 {
        self.cooldown.remaining_secs()
    }

    /// Recorded visits, newest first.
    pub fn visits(&self) -> impl ExactSizeIterator<Item = &VisitRecord> {
        self.history.visits()
    }

    /// Diagnostic log, newest first.
    pub fn log_entries(&self) -> impl ExactSizeIterator<Item = &LogEntry> {
        self.history.entries()
    }

    /// Limit draft.
    pub fn draft_limit(&self) -> u32 {
        self.draft_limit
    }

    /// Lockout length draft, in minutes.
    pub fn draft_lock_minutes(&self) -> u32 {
        self.draft_lock_minutes
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Last insight text.
    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    /// Whether an insight request is in flight.
    pub fn insight_pending(&self) -> bool {
        self.insight_pending
    }
}
