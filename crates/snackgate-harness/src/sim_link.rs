//! Simulated device link.
//!
//! [`SimDevice`] is the test's handle on a fake gate: it injects inbound
//! bytes, records what the console wrote and scripts failures. The
//! [`SimConnector`] it hands out implements [`Connector`], so the production
//! runtime opens and closes simulated links exactly as it would real ports.

use std::{
    collections::VecDeque,
    future::{self, Future},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use snackgate_app::{ConnectionError, Connector, OpenError, SelectionError, Transport};
use tokio::sync::mpsc;

type Inbound = Result<Vec<u8>, ConnectionError>;

#[derive(Debug)]
struct DeviceState {
    port: String,
    supported: bool,
    open_failures: VecDeque<OpenError>,
    /// Opens never complete while set.
    stall_opens: bool,
    /// Sender for the currently open link.
    inbound: Option<mpsc::UnboundedSender<Inbound>>,
    written: Vec<u8>,
    fail_writes: bool,
    opens: u32,
    closes: u32,
}

/// Test handle on a simulated gate. Clones share the same device.
#[derive(Debug, Clone)]
pub struct SimDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl SimDevice {
    /// Create a device reachable at `port`.
    pub fn new(port: impl Into<String>) -> Self {
        let state = DeviceState {
            port: port.into(),
            supported: true,
            open_failures: VecDeque::new(),
            stall_opens: false,
            inbound: None,
            written: Vec::new(),
            fail_writes: false,
            opens: 0,
            closes: 0,
        };
        Self { state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Connector that opens links to this device.
    pub fn connector(&self) -> SimConnector {
        SimConnector { device: self.clone() }
    }

    /// Make the platform report no serial capability.
    pub fn set_unsupported(&self) {
        self.lock().supported = false;
    }

    /// Make the next `open` fail with `error`.
    pub fn fail_next_open(&self, error: OpenError) {
        self.lock().open_failures.push_back(error);
    }

    /// Make opens hang, like a bridge that never answers. Affects opens
    /// started after the call.
    pub fn stall_opens(&self, stall: bool) {
        self.lock().stall_opens = stall;
    }

    /// Make every write fail until cleared.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Deliver `bytes` as one chunk. Returns `false` if no link is open.
    pub fn send(&self, bytes: &[u8]) -> bool {
        let state = self.lock();
        match &state.inbound {
            Some(tx) => tx.send(Ok(bytes.to_vec())).is_ok(),
            None => false,
        }
    }

    /// Make the pending read fail with `error`.
    pub fn fail_read(&self, error: ConnectionError) -> bool {
        let state = self.lock();
        match &state.inbound {
            Some(tx) => tx.send(Err(error)).is_ok(),
            None => false,
        }
    }

    /// End the stream from the device side once queued chunks are read.
    pub fn hang_up(&self) {
        self.lock().inbound = None;
    }

    /// Whether a link is currently open.
    pub fn is_open(&self) -> bool {
        self.lock().inbound.is_some()
    }

    /// Everything the console wrote, split into lines.
    pub fn written_lines(&self) -> Vec<String> {
        let state = self.lock();
        String::from_utf8_lossy(&state.written).lines().map(str::to_owned).collect()
    }

    /// Raw bytes the console wrote.
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Number of successful opens.
    pub fn opens(&self) -> u32 {
        self.lock().opens
    }

    /// Number of closes.
    pub fn closes(&self) -> u32 {
        self.lock().closes
    }
}

/// Opens links to a [`SimDevice`].
#[derive(Debug, Clone)]
pub struct SimConnector {
    device: SimDevice,
}

impl Connector for SimConnector {
    type Transport = SimTransport;

    fn check_support(&self) -> Result<(), SelectionError> {
        if self.device.lock().supported { Ok(()) } else { Err(SelectionError::NotSupported) }
    }

    fn open(&self) -> impl Future<Output = Result<SimTransport, OpenError>> + Send + 'static {
        let device = self.device.clone();
        async move {
            let stalled = device.lock().stall_opens;
            if stalled {
                future::pending::<()>().await;
            }
            device.open_link()
        }
    }
}

impl SimDevice {
    fn open_link(&self) -> Result<SimTransport, OpenError> {
        let mut state = self.lock();
        if !state.supported {
            return Err(SelectionError::NotSupported.into());
        }
        if let Some(error) = state.open_failures.pop_front() {
            return Err(error);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.inbound = Some(tx);
        state.opens += 1;
        tracing::debug!("Simulated device opened on {}", state.port);

        Ok(SimTransport { name: state.port.clone(), inbound: rx, device: self.clone(), closed: false })
    }
}

/// One open simulated link.
#[derive(Debug)]
pub struct SimTransport {
    name: String,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    device: SimDevice,
    closed: bool,
}

impl Transport for SimTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self) -> Result<Option<Vec<u8>>, ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Closed);
        }
        match self.inbound.recv().await {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Closed);
        }
        let mut state = self.device.lock();
        if state.fail_writes {
            return Err(ConnectionError::Write("device unplugged".to_owned()));
        }
        state.written.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.inbound.close();

        let mut state = self.device.lock();
        state.inbound = None;
        state.closes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_flow_until_hang_up() {
        let device = SimDevice::new("sim0");
        let mut transport = device.connector().open().await.unwrap();

        assert!(device.send(b"LOCKED\n"));
        device.hang_up();

        assert_eq!(transport.read().await, Ok(Some(b"LOCKED\n".to_vec())));
        assert_eq!(transport.read().await, Ok(None));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let device = SimDevice::new("sim0");
        let mut transport = device.connector().open().await.unwrap();

        transport.close().await;
        transport.close().await;

        assert_eq!(device.closes(), 1);
        assert!(!device.is_open());
        assert_eq!(transport.write(b"OPEN\n").await, Err(ConnectionError::Closed));
    }

    #[tokio::test]
    async fn scripted_open_failure() {
        let device = SimDevice::new("sim0");
        device.fail_next_open(SelectionError::NoDeviceSelected.into());

        let connector = device.connector();
        assert!(matches!(connector.open().await, Err(OpenError::Selection(SelectionError::NoDeviceSelected))));
        assert!(connector.open().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_open_never_completes() {
        let device = SimDevice::new("sim0");
        device.stall_opens(true);
        let connector = device.connector();

        let attempt = tokio::time::timeout(std::time::Duration::from_secs(600), connector.open()).await;
        assert!(attempt.is_err());
        assert_eq!(device.opens(), 0);

        device.stall_opens(false);
        assert!(connector.open().await.is_ok());
        assert_eq!(device.opens(), 1);
    }
}
