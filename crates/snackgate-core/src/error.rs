//! Error types for local configuration changes.

use thiserror::Error;

/// Rejected configuration values.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The visit quota must be at least one.
    #[error("invalid limit {0}: must be at least 1")]
    InvalidLimit(u32),
}
