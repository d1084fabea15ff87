//! Link session bookkeeping.

use snackgate_proto::LineFramer;

/// Connection state as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// The platform has no serial link capability. Terminal for the process.
    Unsupported,
    /// No link.
    #[default]
    Disconnected,
    /// Link is being opened.
    Connecting,
    /// Link is open.
    Connected {
        /// Name of the opened port.
        port: String,
    },
}

impl ConnectionState {
    /// Whether a link is open.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// One open link: the port name and the framer holding its partial line.
///
/// A fresh session starts with an empty framer, so a partial line left by a
/// previous link never leaks into the next one.
#[derive(Debug)]
pub struct Session {
    port: String,
    framer: LineFramer,
}

impl Session {
    /// Start a session on the named port.
    pub fn new(port: impl Into<String>) -> Self {
        Self { port: port.into(), framer: LineFramer::new() }
    }

    /// Name of the port.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Feed a chunk read from the link and return the complete lines.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.framer.push(bytes)
    }

    /// Bytes held back waiting for a terminator.
    pub fn pending(&self) -> &[u8] {
        self.framer.pending()
    }
}
