//! Fuzz target for the inbound line pipeline
//!
//! Arbitrary serial noise, split at arbitrary points, pushed through the
//! framer, the interpreter and the reducer.
//!
//! # Invariants
//!
//! - Nothing panics, whatever the bytes
//! - Chunk boundaries never change the emitted lines
//! - Emitted lines are non-empty, trimmed, newline-free and at most
//!   `MAX_LINE_LEN` bytes
//! - `count` never exceeds the quota and `Unlocked` always clears the anchor

#![no_main]

use std::num::NonZeroU32;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use snackgate_core::{AppState, apply};
use snackgate_proto::{DomainEvent, LineFramer, MAX_LINE_LEN};

#[derive(Debug, Arbitrary)]
struct Input {
    stream: Vec<u8>,
    cuts: Vec<u16>,
    limit: u8,
    lock_minutes: u8,
}

fuzz_target!(|input: Input| {
    let mut whole = LineFramer::new();
    let expected = whole.push(&input.stream);

    let mut cuts: Vec<usize> = input.cuts.iter().map(|&c| usize::from(c) % (input.stream.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut split = LineFramer::new();
    let mut lines = Vec::new();
    let mut start = 0;
    for cut in cuts {
        lines.extend(split.push(&input.stream[start..cut]));
        start = cut;
    }
    lines.extend(split.push(&input.stream[start..]));

    assert_eq!(lines, expected, "chunking changed the emitted lines");

    let limit = NonZeroU32::new(u32::from(input.limit)).unwrap_or(NonZeroU32::MIN);
    let mut state = AppState::new(limit, u32::from(input.lock_minutes));

    for (now, line) in lines.iter().enumerate() {
        assert!(!line.is_empty());
        assert!(!line.contains('\n'));
        assert_eq!(line.trim(), line);
        assert!(line.len() <= MAX_LINE_LEN);

        let event = DomainEvent::parse(line);
        state = apply(&state, &event, now as u64);

        assert!(state.count() <= state.limit().get());
        if event == DomainEvent::Unlocked {
            assert_eq!(state.count(), 0);
            assert!(state.lock_anchor().is_none());
        }
        if state.lock_anchor().is_some() {
            assert!(state.is_locked());
        }
    }
});
