//! Serial port link.
//!
//! `serialport` only offers blocking reads, so each open link runs a reader
//! thread that forwards chunks over a bounded channel. [`SerialTransport::read`]
//! is a plain channel receive and therefore cancel-safe. Closing raises a stop
//! flag, closes the channel, joins the reader and drops the port. Opening
//! runs on the blocking pool so a slow driver never stalls the event loop.

use std::{
    future::Future,
    io::{self, Read, Write},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use serialport::{ErrorKind, SerialPort, SerialPortInfo, SerialPortType};
use snackgate_app::{ConnectionError, Connector, OpenError, SelectionError, Transport};
use tokio::sync::mpsc;

use crate::{INBOUND_CHANNEL_CAPACITY, SerialConfig};

type Inbound = Result<Vec<u8>, ConnectionError>;
type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

/// Opens serial links.
#[derive(Debug, Clone, Default)]
pub struct SerialConnector {
    config: SerialConfig,
}

impl SerialConnector {
    /// Create a connector with the given settings.
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

}

fn select_port(config: &SerialConfig) -> Result<String, SelectionError> {
    if let Some(port) = &config.port {
        return Ok(port.clone());
    }
    let ports = serialport::available_ports().map_err(|e| {
        tracing::warn!("Failed to enumerate serial ports: {e}");
        match e.kind() {
            ErrorKind::Unknown => SelectionError::NotSupported,
            _ => SelectionError::NoDeviceSelected,
        }
    })?;
    pick_port(ports).ok_or(SelectionError::NoDeviceSelected)
}

fn open_port(config: &SerialConfig) -> Result<SerialTransport, OpenError> {
    let name = select_port(config)?;
    tracing::debug!("Opening serial port {} at {} baud", name, config.baud_rate);

    let port = serialport::new(&name, config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(|e| open_error(&name, &e))?;
    let reader = port.try_clone().map_err(|e| open_error(&name, &e))?;

    SerialTransport::start(name, port, reader, config.read_buffer)
}

impl Connector for SerialConnector {
    type Transport = SerialTransport;

    fn check_support(&self) -> Result<(), SelectionError> {
        if self.config.port.is_some() {
            return Ok(());
        }
        match serialport::available_ports() {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::Unknown => {
                tracing::debug!("Serial enumeration unavailable: {e}");
                Err(SelectionError::NotSupported)
            },
            Err(e) => {
                tracing::warn!("Serial enumeration failed: {e}");
                Ok(())
            },
        }
    }

    fn open(&self) -> impl Future<Output = Result<SerialTransport, OpenError>> + Send + 'static {
        let config = self.config.clone();
        async move {
            let limit = config.connect_timeout;
            match tokio::time::timeout(limit, tokio::task::spawn_blocking(move || open_port(&config))).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(ConnectionError::Open(format!("open task failed: {e}")).into()),
                Err(_) => Err(ConnectionError::Open(format!("timed out after {limit:?}")).into()),
            }
        }
    }
}

/// Choose a port: the first USB port, otherwise the first port listed.
fn pick_port(ports: Vec<SerialPortInfo>) -> Option<String> {
    let usb = ports.iter().position(|p| matches!(p.port_type, SerialPortType::UsbPort(_)));
    let index = usb.unwrap_or(0);
    ports.into_iter().nth(index).map(|p| p.port_name)
}

fn open_error(name: &str, error: &serialport::Error) -> OpenError {
    match error.kind() {
        ErrorKind::Io(io::ErrorKind::PermissionDenied) => SelectionError::PermissionDenied(name.to_owned()).into(),
        _ => ConnectionError::Open(format!("{name}: {error}")).into(),
    }
}

/// One open serial link.
pub struct SerialTransport {
    name: String,
    inbound: mpsc::Receiver<Inbound>,
    /// Write handle. `None` once closed.
    port: Option<SharedPort>,
    stop: Arc<AtomicBool>,
    reader: Option<thread::JoinHandle<()>>,
}

impl SerialTransport {
    fn start(
        name: String,
        port: Box<dyn SerialPort>,
        reader: Box<dyn SerialPort>,
        read_buffer: usize,
    ) -> Result<Self, OpenError> {
        let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(format!("serial-reader {name}"))
            .spawn(move || read_loop(reader, read_buffer.max(1), &thread_stop, &tx))
            .map_err(|e| ConnectionError::Open(format!("{name}: failed to start reader: {e}")))?;

        Ok(Self { name, inbound: rx, port: Some(Arc::new(Mutex::new(port))), stop, reader: Some(handle) })
    }
}

/// Forward chunks until stopped, closed by the receiver, or the port fails.
fn read_loop(mut port: Box<dyn SerialPort>, read_buffer: usize, stop: &AtomicBool, tx: &mpsc::Sender<Inbound>) {
    let mut buf = vec![0u8; read_buffer];
    while !stop.load(Ordering::Acquire) {
        match port.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.blocking_send(Ok(buf[..n].to_vec())).is_err() {
                    break;
                }
            },
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::Interrupted) => {},
            Err(e) => {
                if !stop.load(Ordering::Acquire) {
                    let _ = tx.blocking_send(Err(ConnectionError::Read(e.to_string())));
                }
                break;
            },
        }
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&mut self) -> Result<Option<Vec<u8>>, ConnectionError> {
        if self.port.is_none() {
            return Err(ConnectionError::Closed);
        }
        match self.inbound.recv().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), ConnectionError> {
        let Some(port) = &self.port else {
            return Err(ConnectionError::Closed);
        };

        let port = Arc::clone(port);
        let bytes = bytes.to_vec();
        let written = tokio::task::spawn_blocking(move || {
            let mut port = port.lock().unwrap_or_else(PoisonError::into_inner);
            port.write_all(&bytes)?;
            port.flush()
        })
        .await;

        match written {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ConnectionError::Write(e.to_string())),
            Err(e) => Err(ConnectionError::Write(format!("writer task failed: {e}"))),
        }
    }

    async fn close(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.inbound.close();

        if let Some(reader) = self.reader.take() {
            match tokio::task::spawn_blocking(move || reader.join()).await {
                Ok(Ok(())) => {},
                Ok(Err(_)) => tracing::warn!("Serial reader for {} panicked", self.name),
                Err(e) => tracing::warn!("Failed to join serial reader for {}: {e}", self.name),
            }
        }

        if self.port.take().is_some() {
            tracing::debug!("Released serial port {}", self.name);
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        // Let a detached reader exit on its next timeout
        self.stop.store(true, Ordering::Release);
    }
}
