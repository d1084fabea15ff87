//! Newline framing for the inbound byte stream.
//!
//! The serial link delivers bytes in chunks whose boundaries carry no meaning:
//! a single message may arrive across several reads, and a single read may
//! carry several messages. [`LineFramer`] carries the unterminated tail across
//! calls and only emits a line once its `\n` has been seen.

use bytes::BytesMut;

/// Longest line the framer will buffer before discarding it.
///
/// The device never sends more than a few dozen bytes per line. Anything
/// longer is line noise (wrong baud rate, a device that never sends `\n`) and
/// is dropped up to the next terminator.
pub const MAX_LINE_LEN: usize = 1024;

/// Buffers input and emits a line whenever a newline is encountered.
///
/// Lines are decoded lossily as UTF-8 and trimmed, so a trailing `\r` from a
/// CRLF sender disappears. Lines that are empty after trimming are dropped.
///
/// # Invariants
///
/// - Every byte is part of exactly one emitted line, the pending buffer, or a
///   discarded overlong line. Nothing is emitted twice.
/// - The result depends only on the concatenation of all pushed chunks, never
///   on where the chunk boundaries fall.
#[derive(Debug, Clone, Default)]
pub struct LineFramer {
    pending: BytesMut,
    /// Set while discarding the remainder of an overlong line.
    overflowed: bool,
    discarded: u64,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self { pending: BytesMut::with_capacity(128), overflowed: false, discarded: 0 }
    }

    /// Ingest a chunk and return every line it completes, in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            self.pending.extend_from_slice(head);
            let raw = self.pending.split();

            if self.overflowed || raw.len() > MAX_LINE_LEN {
                self.overflowed = false;
                self.discarded += 1;
                continue;
            }

            if let Some(line) = decode_line(&raw) {
                lines.push(line);
            }
        }

        self.pending.extend_from_slice(rest);
        if self.pending.len() > MAX_LINE_LEN {
            self.pending.clear();
            self.overflowed = true;
        }

        lines
    }

    /// Drop any partial line. Called when a new session starts.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.overflowed = false;
    }

    /// Bytes received since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Number of overlong lines dropped since creation.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk_many_lines() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"REMAINING:2\nLOCKED\n");
        assert_eq!(lines, vec!["REMAINING:2", "LOCKED"]);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn partial_line_carried_over() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"REMAI").is_empty());
        assert_eq!(framer.pending(), b"REMAI");

        let lines = framer.push(b"NING:4\nUNLO");
        assert_eq!(lines, vec!["REMAINING:4"]);
        assert_eq!(framer.pending(), b"UNLO");

        let lines = framer.push(b"CKED\n");
        assert_eq!(lines, vec!["UNLOCKED"]);
    }

    #[test]
    fn crlf_and_blank_lines() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"LOCKED\r\n\r\n   \n\nUNLOCKED\r\n");
        assert_eq!(lines, vec!["LOCKED", "UNLOCKED"]);
    }

    #[test]
    fn reset_drops_partial() {
        let mut framer = LineFramer::new();
        let _ = framer.push(b"REMAINING:");
        framer.reset();
        assert_eq!(framer.push(b"LOCKED\n"), vec!["LOCKED"]);
    }

    #[test]
    fn overlong_line_discarded_to_next_terminator() {
        let mut framer = LineFramer::new();
        let noise = vec![b'x'; MAX_LINE_LEN + 10];
        assert!(framer.push(&noise).is_empty());
        assert!(framer.pending().is_empty());

        // Tail of the overlong line is still dropped
        let lines = framer.push(b"yyy\nLOCKED\n");
        assert_eq!(lines, vec!["LOCKED"]);
        assert_eq!(framer.discarded(), 1);
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"\xffLOCKED\n");
        assert_eq!(lines, vec!["\u{fffd}LOCKED"]);
    }
}
