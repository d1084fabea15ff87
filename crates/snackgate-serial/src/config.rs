//! Link configuration.

use std::time::Duration;

/// Gate firmware talks at 9600 baud.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Bytes requested per read.
pub const DEFAULT_READ_BUFFER: usize = 256;

/// Blocking read timeout. Bounds how long closing waits for the reader.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Longest wait for a bridge to accept a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest wait for one command to be written to a stream link.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Chunks buffered between the reader thread and the runtime.
pub const INBOUND_CHANNEL_CAPACITY: usize = 64;

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port to open. `None` picks the first attached port, USB first.
    pub port: Option<String>,
    /// Line speed.
    pub baud_rate: u32,
    /// Bytes requested per read.
    pub read_buffer: usize,
    /// Blocking read timeout.
    pub read_timeout: Duration,
    /// Connect timeout for bridged links.
    pub connect_timeout: Duration,
    /// Write timeout for stream links.
    pub write_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_buffer: DEFAULT_READ_BUFFER,
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}
