//! Integration tests for App behavior against a simulated clock.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - Gate state reflects the device-confirmed readings
//! - History holds the expected visits and log lines
//! - The countdown is derived from elapsed time, not message arrival

use std::time::Duration;

use snackgate_app::{App, AppAction, AppEvent, ConnectionState, SessionConfig};
use snackgate_harness::SimEnv;
use snackgate_proto::Command;

/// Create a connected App ready for testing.
fn connected_app(env: &SimEnv) -> App<SimEnv> {
    let mut app = App::new(env.clone(), SessionConfig::default());
    let _ = app.handle(AppEvent::Connected { port: "/dev/ttyUSB0".into() });
    app
}

fn receive(app: &mut App<SimEnv>, line: &str) -> Vec<AppAction> {
    app.handle(AppEvent::BytesReceived(format!("{line}\n").into_bytes()))
}

fn log_lines(app: &App<SimEnv>) -> Vec<String> {
    app.log_entries().map(|e| e.text.clone()).collect()
}

#[test]
fn lockout_episode_with_countdown() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);
    let _ = app.apply_lock_duration(2);

    let _ = receive(&mut app, "REMAINING:5");
    assert_eq!(app.state().count(), 0);
    assert!(!app.state().is_locked());

    let _ = receive(&mut app, "REMAINING:0");
    assert_eq!(app.state().count(), 5);
    assert!(app.state().is_locked());
    assert_eq!(app.state().lock_anchor(), Some(Duration::ZERO));

    env.advance(Duration::from_secs(61));
    let actions = app.handle(AppEvent::Tick);
    assert_eq!(actions, vec![AppAction::Render]);
    assert_eq!(app.cooldown_remaining_secs(), 59);

    let _ = receive(&mut app, "UNLOCKED");

    // Oracle: episode fully reset
    assert_eq!(app.state().count(), 0);
    assert!(!app.state().is_locked());
    assert_eq!(app.state().lock_anchor(), None);
    assert_eq!(app.cooldown_remaining_secs(), 0);
    assert!(!app.cooldown_armed());
}

#[test]
fn repeated_lock_keeps_first_anchor() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);
    let _ = app.apply_lock_duration(1);

    let _ = receive(&mut app, "LOCKED");
    env.advance(Duration::from_secs(30));
    let _ = receive(&mut app, "LOCKED");
    let _ = receive(&mut app, "REMAINING:0");
    let _ = app.handle(AppEvent::Tick);

    assert_eq!(app.state().lock_anchor(), Some(Duration::ZERO));
    assert_eq!(app.cooldown_remaining_secs(), 30);
}

#[test]
fn countdown_floors_partial_seconds() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);
    let _ = app.apply_lock_duration(1);
    let _ = receive(&mut app, "LOCKED");

    env.advance(Duration::from_millis(1_999));
    let _ = app.handle(AppEvent::Tick);
    assert_eq!(app.cooldown_remaining_secs(), 59);

    env.advance(Duration::from_secs(600));
    let _ = app.handle(AppEvent::Tick);
    assert_eq!(app.cooldown_remaining_secs(), 0);
    // Still locked until the device says otherwise
    assert!(app.state().is_locked());
}

#[test]
fn live_limit_used_for_next_reading() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);

    let actions = app.apply_limit(10);
    assert_eq!(actions, vec![AppAction::Send(Command::Limit(10)), AppAction::Render]);

    let _ = receive(&mut app, "REMAINING:3");
    assert_eq!(app.state().count(), 7);
}

#[test]
fn malformed_reading_changes_nothing() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);
    let _ = receive(&mut app, "REMAINING:4");
    let before = app.state().clone();

    let _ = receive(&mut app, "REMAINING:abc");

    assert_eq!(app.state(), &before);
    assert_eq!(log_lines(&app).first().map(String::as_str), Some("REMAINING:abc"));
    assert_eq!(app.visits().len(), 1);
}

#[test]
fn visits_record_count_and_time() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);

    let _ = receive(&mut app, "REMAINING:4");
    env.advance(Duration::from_secs(90));
    let _ = receive(&mut app, "REMAINING:2");
    let _ = receive(&mut app, "REMAINING:2");

    let visits: Vec<_> = app.visits().map(|v| (v.id, v.count_at_visit, v.timestamp)).collect();
    assert_eq!(visits, [
        (2, 3, snackgate_harness::sim_env::SIM_EPOCH_SECS + 90),
        (1, 1, snackgate_harness::sim_env::SIM_EPOCH_SECS),
    ]);
}

#[test]
fn log_is_bounded_newest_first() {
    let env = SimEnv::new();
    let mut app = App::new(env.clone(), SessionConfig { log_capacity: 3, ..SessionConfig::default() });
    let _ = app.handle(AppEvent::Connected { port: "sim".into() });

    for n in 0..5 {
        let _ = receive(&mut app, &format!("NOISE {n}"));
    }

    assert_eq!(log_lines(&app), ["NOISE 4", "NOISE 3", "NOISE 2"]);
}

#[test]
fn disconnect_keeps_gate_state() {
    let env = SimEnv::new();
    let mut app = connected_app(&env);
    let _ = receive(&mut app, "REMAINING:0");

    let _ = app.handle(AppEvent::Disconnected { reason: None });

    assert_eq!(app.connection_state(), &ConnectionState::Disconnected);
    assert!(app.state().is_locked());
    assert_eq!(app.state().count(), 5);
    assert_eq!(log_lines(&app).first().map(String::as_str), Some("disconnected"));
}
