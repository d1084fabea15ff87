//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Connector`] / [`Transport`]: the device link
//! - [`InsightService`]: advisory collaborator, run off the loop
//! - [`Driver`]: Platform-specific operator I/O
//!
//! Opening a link is itself one of the awaited sources, so operator input and
//! the cooldown keep flowing while a connect is pending, and dropping the
//! pending open cancels it.
//!
//! A single task owns the App and applies every event in turn, so an operator
//! change (for example a new limit) is visible to the very next inbound
//! chunk, including chunks already buffered by the transport.

use std::{
    future::{self, Future},
    pin::Pin,
    sync::Arc,
};

use snackgate_core::Environment;
use snackgate_proto::Command;
use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};

use crate::{
    App, AppAction, AppEvent, ConnectionError, Connector, Driver, InsightError, InsightRequest, InsightService,
    OpenError, SelectionError, SessionConfig, Transport,
};

type InsightResult = Result<String, InsightError>;
type PendingOpen<T> = Pin<Box<dyn Future<Output = Result<T, OpenError>> + Send>>;

/// Reason reported when the operator abandons a pending connect.
const CONNECT_CANCELLED: &str = "cancelled by operator";

/// One wake-up of the event loop.
enum Step<T> {
    Input(Option<AppEvent>),
    Opened(Result<T, OpenError>),
    Inbound(Result<Option<Vec<u8>>, ConnectionError>),
    Insight(InsightResult),
    Tick,
}

/// Generic runtime that orchestrates App, Connector, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific operator I/O driver
/// - `C`: Device link connector
/// - `E`: Environment providing time
pub struct Runtime<D, C, E>
where
    D: Driver,
    C: Connector,
    E: Environment,
{
    driver: D,
    connector: C,
    app: App<E>,
    /// Open link. `None` while disconnected.
    transport: Option<C::Transport>,
    /// Connect in progress. Dropping it abandons the attempt.
    opening: Option<PendingOpen<C::Transport>>,
    insight: Arc<dyn InsightService>,
    insight_tx: mpsc::Sender<InsightResult>,
    insight_rx: mpsc::Receiver<InsightResult>,
    /// Cooldown tick source. Only present while the App reports an armed
    /// cooldown.
    cooldown: Option<Interval>,
}

impl<D, C, E> Runtime<D, C, E>
where
    D: Driver,
    C: Connector,
    E: Environment,
{
    /// Create a new runtime.
    pub fn new(driver: D, connector: C, env: E, config: SessionConfig, insight: Arc<dyn InsightService>) -> Self {
        let (insight_tx, insight_rx) = mpsc::channel(1);
        Self {
            driver,
            connector,
            app: App::new(env, config),
            transport: None,
            opening: None,
            insight,
            insight_tx,
            insight_rx,
            cooldown: None,
        }
    }

    /// Run the main event loop until the operator quits.
    ///
    /// The loop waits on, in priority order: operator input, a pending
    /// connect, inbound link bytes, insight results and the cooldown tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error. Link failures
    /// are reported to the App and never end the loop.
    pub async fn run(mut self) -> Result<(), D::Error> {
        match self.connector.check_support() {
            Ok(()) => {},
            Err(SelectionError::NotSupported) => {
                tracing::error!("Serial links are not supported on this platform");
                let _ = self.app.handle(AppEvent::PlatformUnsupported);
            },
            Err(e) => tracing::warn!("Device support check failed: {e}"),
        }
        self.driver.render(&self.app)?;

        let result = self.event_loop().await;

        self.opening = None;
        self.close_transport().await;
        self.driver.stop();
        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        loop {
            let step = self.next_step().await?;
            let actions = self.process_step(step).await;
            if self.process_actions(actions).await? {
                return Ok(());
            }
            self.sync_cooldown();
        }
    }

    async fn next_step(&mut self) -> Result<Step<C::Transport>, D::Error> {
        let Self { driver, transport, opening, insight_rx, cooldown, .. } = self;

        tokio::select! {
            biased;
            event = driver.poll_event() => event.map(Step::Input),
            opened = poll_open(opening) => Ok(Step::Opened(opened)),
            inbound = read_link(transport) => Ok(Step::Inbound(inbound)),
            Some(result) = insight_rx.recv() => Ok(Step::Insight(result)),
            () = tick(cooldown) => Ok(Step::Tick),
        }
    }

    async fn process_step(&mut self, step: Step<C::Transport>) -> Vec<AppAction> {
        match step {
            Step::Input(Some(event)) => self.app.handle(event),
            Step::Input(None) => vec![],
            Step::Opened(result) => {
                self.opening = None;
                self.finish_open(result)
            },
            Step::Inbound(Ok(Some(bytes))) => {
                tracing::debug!("Received {} bytes: {:?}", bytes.len(), String::from_utf8_lossy(&bytes));
                self.app.handle(AppEvent::BytesReceived(bytes))
            },
            Step::Inbound(Ok(None)) => {
                tracing::info!("Device closed the link");
                self.teardown(Some("device closed the link".to_owned())).await
            },
            Step::Inbound(Err(e)) => {
                tracing::error!("Link read failed: {e}");
                self.teardown(Some(e.to_string())).await
            },
            Step::Insight(Ok(text)) => self.app.handle(AppEvent::InsightReady(text)),
            Step::Insight(Err(e)) => {
                tracing::warn!("Insight request failed: {e}");
                self.app.handle(AppEvent::InsightFailed { reason: e.to_string() })
            },
            Step::Tick => self.app.handle(AppEvent::Tick),
        }
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Connect => self.start_open(),
                    AppAction::Disconnect => {
                        if self.opening.take().is_some() {
                            tracing::info!("Connect cancelled");
                            let reason = CONNECT_CANCELLED.to_owned();
                            pending_actions.extend(self.app.handle(AppEvent::ConnectFailed { reason }));
                        } else if self.transport.is_some() {
                            pending_actions.extend(self.teardown(None).await);
                        }
                    },
                    AppAction::Send(command) => pending_actions.extend(self.send(command).await),
                    AppAction::RequestInsight(request) => self.spawn_insight(request),
                }
            }
        }
        Ok(false)
    }

    fn start_open(&mut self) {
        if self.transport.is_some() || self.opening.is_some() {
            tracing::warn!("Connect requested while a link is open or opening");
            return;
        }
        tracing::debug!("Opening link");
        self.opening = Some(Box::pin(self.connector.open()));
    }

    fn finish_open(&mut self, result: Result<C::Transport, OpenError>) -> Vec<AppAction> {
        match result {
            Ok(transport) => {
                let port = transport.name().to_owned();
                tracing::info!("Connected to {port}");
                self.transport = Some(transport);
                self.app.handle(AppEvent::Connected { port })
            },
            Err(OpenError::Selection(SelectionError::NotSupported)) => {
                tracing::error!("Serial links are not supported on this platform");
                self.app.handle(AppEvent::PlatformUnsupported)
            },
            Err(e) => {
                tracing::warn!("Failed to connect: {e}");
                self.app.handle(AppEvent::ConnectFailed { reason: e.to_string() })
            },
        }
    }

    async fn send(&mut self, command: Command) -> Vec<AppAction> {
        let Some(transport) = self.transport.as_mut() else {
            tracing::warn!("Dropping {command}: no open link");
            return vec![];
        };

        let result = transport.write(&command.encode()).await;
        match result {
            Ok(()) => {
                tracing::debug!("Sent {command}");
                self.app.handle(AppEvent::Sent(command))
            },
            Err(e) => {
                tracing::error!("Failed to send {command}: {e}");
                self.teardown(Some(e.to_string())).await
            },
        }
    }

    /// Close the link and tell the App. `reason` is `None` for an operator
    /// disconnect.
    async fn teardown(&mut self, reason: Option<String>) -> Vec<AppAction> {
        self.close_transport().await;
        self.app.handle(AppEvent::Disconnected { reason })
    }

    async fn close_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            tracing::info!("Closed link to {}", transport.name());
        }
    }

    fn spawn_insight(&self, request: InsightRequest) {
        let service = Arc::clone(&self.insight);
        let tx = self.insight_tx.clone();
        tokio::spawn(async move {
            let result = service.generate(&request).await;
            if tx.send(result).await.is_err() {
                tracing::debug!("Insight result dropped: runtime stopped");
            }
        });
    }

    /// Start or stop the cooldown tick to match the App.
    fn sync_cooldown(&mut self) {
        if !self.app.cooldown_armed() {
            self.cooldown = None;
            return;
        }
        if self.cooldown.is_none() {
            let mut interval = tokio::time::interval(self.app.config().cooldown_period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.cooldown = Some(interval);
        }
    }
}

async fn read_link<T: Transport>(transport: &mut Option<T>) -> Result<Option<Vec<u8>>, ConnectionError> {
    match transport {
        Some(transport) => transport.read().await,
        None => future::pending().await,
    }
}

async fn poll_open<T>(opening: &mut Option<PendingOpen<T>>) -> Result<T, OpenError> {
    match opening {
        Some(open) => open.await,
        None => future::pending().await,
    }
}

async fn tick(cooldown: &mut Option<Interval>) {
    match cooldown {
        Some(interval) => {
            interval.tick().await;
        },
        None => future::pending().await,
    }
}
