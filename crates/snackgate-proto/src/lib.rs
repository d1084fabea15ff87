//! Snack gate wire protocol
//!
//! The device speaks newline-terminated UTF-8 text over a serial byte link.
//! This crate holds everything needed to turn raw bytes into typed events and
//! typed commands back into bytes. It performs no I/O.
//!
//! # Components
//!
//! - [`LineFramer`]: splits an arbitrarily chunked byte stream into lines
//! - [`DomainEvent`]: typed interpretation of one inbound line
//! - [`Command`]: outbound command vocabulary and its encoding
//!
//! # Inbound
//!
//! ```text
//! REMAINING:<int>   visits left before lockout
//! LOCKED            quota exhausted, gate locked
//! UNLOCKED          gate released
//! AUTO UNLOCKED     gate released by the device's own timer
//! ```
//!
//! Any other text is accepted and surfaced as [`DomainEvent::Unrecognized`].

#![forbid(unsafe_code)]

pub mod command;
pub mod errors;
pub mod framer;
pub mod message;

pub use command::{Command, LINE_TERMINATOR, encode};
pub use errors::{ProtocolError, Result};
pub use framer::{LineFramer, MAX_LINE_LEN};
pub use message::{DomainEvent, Mode, parse_remaining};
