//! Device links for the snack gate console.
//!
//! Implementations of [`snackgate_app::Connector`] and
//! [`snackgate_app::Transport`] over real byte streams:
//!
//! - [`SerialConnector`]: USB/RS-232 serial ports via `serialport`
//! - [`TcpConnector`]: serial-over-TCP bridges (ser2net and similar)
//! - [`StreamTransport`]: any tokio byte stream

#![forbid(unsafe_code)]

mod config;
mod serial;
mod stream;

pub use config::{
    DEFAULT_BAUD_RATE, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_BUFFER, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT,
    INBOUND_CHANNEL_CAPACITY, SerialConfig,
};
pub use serial::{SerialConnector, SerialTransport};
pub use stream::{StreamTransport, TcpConnector};
