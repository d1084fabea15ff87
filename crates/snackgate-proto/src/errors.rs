//! Protocol error types.

use thiserror::Error;

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while interpreting wire content.
///
/// These never terminate a session. The interpreter downgrades them to
/// [`crate::DomainEvent::Unrecognized`] so the raw line is still logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// `REMAINING:` payload is not a non-negative integer.
    #[error("invalid REMAINING payload in {raw:?}")]
    InvalidRemaining {
        /// The full line as received.
        raw: String,
    },
}
