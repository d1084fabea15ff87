//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use std::time::Duration;

use proptest::prelude::*;
use snackgate_app::{App, AppEvent, Intent, KeyInput, SessionConfig};
use snackgate_harness::{AppSnapshot, InvariantRegistry, SimEnv};

/// Inbound lines a gate might send, including garbage.
fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0u32..12).prop_map(|r| format!("REMAINING:{r}")),
        1 => Just("LOCKED".to_owned()),
        1 => Just("UNLOCKED".to_owned()),
        1 => Just("AUTO UNLOCKED".to_owned()),
        1 => "[ -~]{0,12}",
    ]
}

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        4 => prop::char::range(' ', '~').prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Line(String),
    Key(KeyInput),
    Wait(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => line_strategy().prop_map(Step::Line),
        2 => key_strategy().prop_map(Step::Key),
        1 => (0u64..200).prop_map(Step::Wait),
    ]
}

fn connected(env: &SimEnv) -> App<SimEnv> {
    let mut app = App::new(env.clone(), SessionConfig::default());
    let _ = app.handle(AppEvent::Connected { port: "sim".into() });
    app
}

/// Split `bytes` at the given points.
fn chunks(bytes: &[u8], points: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = points.iter().map(|p| p % (bytes.len() + 1)).collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = Vec::new();
    let mut start = 0;
    for cut in cuts {
        out.push(bytes[start..cut].to_vec());
        start = cut;
    }
    out.push(bytes[start..].to_vec());
    out
}

proptest! {
    /// App invariants hold under arbitrary device traffic and key presses.
    #[test]
    fn prop_app_invariants_hold(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let env = SimEnv::new();
        let mut app = connected(&env);
        let invariants = InvariantRegistry::standard();

        for (frame, step) in steps.iter().enumerate() {
            match step {
                Step::Line(line) => {
                    let _ = app.handle(AppEvent::BytesReceived(format!("{line}\n").into_bytes()));
                },
                Step::Key(KeyInput::Char('q')) => {},
                Step::Key(key) => {
                    let _ = app.handle(AppEvent::Key(*key));
                },
                Step::Wait(secs) => {
                    env.advance(Duration::from_secs(*secs));
                    let _ = app.handle(AppEvent::Tick);
                },
            }

            let snapshot = AppSnapshot::from_app(&app, frame as u64);
            prop_assert!(invariants.check_all(&snapshot).is_ok(), "Invariant violated after {:?}", step);
        }
    }

    /// Chunk boundaries never change the reconciled state.
    #[test]
    fn prop_chunking_is_invisible(
        lines in prop::collection::vec(line_strategy(), 1..20),
        points in prop::collection::vec(any::<usize>(), 0..10)
    ) {
        let stream: String = lines.iter().map(|l| format!("{l}\r\n")).collect();

        let whole_env = SimEnv::new();
        let mut whole = connected(&whole_env);
        let _ = whole.handle(AppEvent::BytesReceived(stream.clone().into_bytes()));

        let split_env = SimEnv::new();
        let mut split = connected(&split_env);
        for chunk in chunks(stream.as_bytes(), &points) {
            let _ = split.handle(AppEvent::BytesReceived(chunk));
        }

        prop_assert_eq!(whole.state(), split.state());
        prop_assert_eq!(whole.visits().len(), split.visits().len());
        prop_assert_eq!(AppSnapshot::from_app(&whole, 0), AppSnapshot::from_app(&split, 0));
    }

    /// Every applied limit is sent and becomes the live limit.
    #[test]
    fn prop_applied_limit_is_live(limit in 1u32..500, remaining in 0u32..600) {
        let env = SimEnv::new();
        let mut app = connected(&env);

        let _ = app.perform(Intent::ApplyLimit(limit));
        let _ = app.handle(AppEvent::BytesReceived(format!("REMAINING:{remaining}\n").into_bytes()));

        prop_assert_eq!(app.state().limit().get(), limit);
        prop_assert_eq!(app.state().count(), limit.saturating_sub(remaining));
    }
}
