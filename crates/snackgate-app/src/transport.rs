//! Device link abstraction.
//!
//! A [`Connector`] selects and opens a port; the [`Transport`] it returns
//! carries raw bytes both ways. Implementations live outside this crate
//! (real serial ports, TCP bridges, simulation).

use std::future::Future;

use thiserror::Error;

/// Failures while choosing a device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Access to the device was refused.
    #[error("permission denied for {0}")]
    PermissionDenied(String),

    /// No device was chosen or none is attached.
    #[error("no device selected")]
    NoDeviceSelected,

    /// The platform has no serial link capability.
    #[error("serial links are not supported on this platform")]
    NotSupported,
}

/// Failures on an opened or opening link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The port could not be opened.
    #[error("failed to open port: {0}")]
    Open(String),

    /// Reading from the link failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Writing to the link failed.
    #[error("write failed: {0}")]
    Write(String),

    /// The link was already closed.
    #[error("link closed")]
    Closed,
}

/// Failures from [`Connector::open`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// Device selection failed.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// The chosen device could not be opened.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// An open, bidirectional byte link.
pub trait Transport: Send {
    /// Name of the underlying port.
    fn name(&self) -> &str;

    /// Wait for the next chunk of bytes.
    ///
    /// Returns `Ok(None)` when the peer closed the link. Must be cancel-safe:
    /// dropping the future loses no bytes.
    fn read(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, ConnectionError>> + Send;

    /// Write all of `bytes`.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the link.
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), ConnectionError>> + Send;

    /// Cancel pending reads, release the port and close it.
    ///
    /// Idempotent. Errors during teardown are tolerated and logged.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Selects and opens device links.
pub trait Connector: Send {
    /// The transport produced by [`Connector::open`].
    type Transport: Transport + 'static;

    /// Check that the platform can open links at all.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NotSupported`] when the capability is absent.
    fn check_support(&self) -> Result<(), SelectionError>;

    /// Select a device and open a link to it.
    ///
    /// The returned future owns what it needs, so the runtime can keep it
    /// pending next to operator input and drop it to cancel the attempt.
    fn open(&self) -> impl Future<Output = Result<Self::Transport, OpenError>> + Send + 'static;
}
