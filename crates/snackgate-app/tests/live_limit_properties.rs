//! Property tests for the live visit quota.
//!
//! Limit changes and device readings arrive in any order. Every reading must
//! be counted against the limit in force when it is handled, never a value
//! captured at connect time.

use proptest::prelude::*;
use snackgate_app::{App, AppEvent, Intent, SessionConfig};
use snackgate_harness::SimEnv;

#[derive(Debug, Clone)]
enum Op {
    ApplyLimit(u32),
    Remaining(u32),
    /// A reading delivered in two chunks, split after `at` bytes.
    SplitRemaining(u32, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (0u32..50).prop_map(Op::ApplyLimit),
        3 => (0u32..60).prop_map(Op::Remaining),
        1 => ((0u32..60), (0usize..16)).prop_map(|(r, at)| Op::SplitRemaining(r, at)),
    ]
}

fn connected(env: &SimEnv) -> App<SimEnv> {
    let mut app = App::new(env.clone(), SessionConfig::default());
    let _ = app.handle(AppEvent::Connected { port: "sim".into() });
    app
}

proptest! {
    /// Each reading yields `max(0, live_limit - remaining)`.
    #[test]
    fn prop_count_uses_live_limit(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let env = SimEnv::new();
        let mut app = connected(&env);
        let mut live = app.state().limit().get();

        for op in ops {
            match op {
                Op::ApplyLimit(limit) => {
                    let _ = app.handle(AppEvent::Intent(Intent::ApplyLimit(limit)));
                    // Zero is rejected and leaves the quota alone
                    if limit > 0 {
                        live = limit;
                    }
                    prop_assert_eq!(app.state().limit().get(), live);
                },
                Op::Remaining(remaining) => {
                    let line = format!("REMAINING:{remaining}\n");
                    let _ = app.handle(AppEvent::BytesReceived(line.into_bytes()));
                    prop_assert_eq!(app.state().count(), live.saturating_sub(remaining));
                },
                Op::SplitRemaining(remaining, at) => {
                    let line = format!("REMAINING:{remaining}\n").into_bytes();
                    let (head, tail) = line.split_at(at.min(line.len()));
                    let _ = app.handle(AppEvent::BytesReceived(head.to_vec()));
                    let _ = app.handle(AppEvent::BytesReceived(tail.to_vec()));
                    prop_assert_eq!(app.state().count(), live.saturating_sub(remaining));
                },
            }
        }
    }

    /// A limit applied between the halves of a split reading still counts
    /// that reading.
    #[test]
    fn prop_limit_change_mid_line_applies(limit in 1u32..50, remaining in 0u32..60, at in 1usize..11) {
        let env = SimEnv::new();
        let mut app = connected(&env);
        let line = format!("REMAINING:{remaining}\n").into_bytes();
        let (head, tail) = line.split_at(at.min(line.len() - 1));

        let _ = app.handle(AppEvent::BytesReceived(head.to_vec()));
        let _ = app.handle(AppEvent::Intent(Intent::ApplyLimit(limit)));
        let _ = app.handle(AppEvent::BytesReceived(tail.to_vec()));

        prop_assert_eq!(app.state().count(), limit.saturating_sub(remaining));
    }
}
