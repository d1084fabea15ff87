//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod gate;
mod help;
mod history;
mod insight;
mod notice;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};
use snackgate_app::App;
use snackgate_core::Environment;

const SECS_PER_DAY: u64 = 86_400;

/// Render the entire UI.
///
/// On an unsupported platform the incompatibility notice replaces every
/// control.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>) {
    const GATE_HEIGHT: u16 = 6;
    const HISTORY_MIN_HEIGHT: u16 = 3;
    const INSIGHT_HEIGHT: u16 = 4;
    const HELP_HEIGHT: u16 = 1;
    const STATUS_HEIGHT: u16 = 1;

    if app.is_unsupported() {
        notice::render(frame, frame.area());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(GATE_HEIGHT),
            Constraint::Min(HISTORY_MIN_HEIGHT),
            Constraint::Length(INSIGHT_HEIGHT),
            Constraint::Length(HELP_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [gate_area, history_area, insight_area, help_area, status_area] = chunks.as_ref() else {
        return;
    };

    gate::render(frame, app, *gate_area);
    render_history_area(frame, app, *history_area);
    insight::render(frame, app, *insight_area);
    help::render(frame, *help_area);
    status::render(frame, app, *status_area);
}

/// Render the history area (visits + diagnostic log).
fn render_history_area<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    const VISITS_WIDTH: u16 = 28;
    const LOG_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(VISITS_WIDTH), Constraint::Min(LOG_MIN_WIDTH)])
        .split(area);

    let [visits_area, log_area] = chunks.as_ref() else {
        return;
    };

    history::render_visits(frame, app, *visits_area);
    history::render_log(frame, app, *log_area);
}

/// UTC time of day for a Unix timestamp, as `HH:MM:SS`.
fn time_of_day(unix_secs: u64) -> String {
    let secs = unix_secs % SECS_PER_DAY;
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

/// A countdown in seconds, as `MM:SS`.
fn countdown(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use ratatui::{Terminal, backend::TestBackend};
    use snackgate_app::{AppEvent, SessionConfig};
    use snackgate_harness::SimEnv;

    use super::*;

    /// Draw `draw_fn` into a `width` x `height` buffer and return its rows.
    pub(crate) fn draw_lines(width: u16, height: u16, draw_fn: impl FnOnce(&mut Frame)) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw_fn).unwrap();

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    pub(crate) fn connected_app(env: &SimEnv) -> App<SimEnv> {
        let mut app = App::new(env.clone(), SessionConfig::default());
        let _ = app.handle(AppEvent::Connected { port: "/dev/ttyACM0".into() });
        app
    }

    pub(crate) fn receive(app: &mut App<SimEnv>, line: &str) {
        let _ = app.handle(AppEvent::BytesReceived(format!("{line}\n").into_bytes()));
    }

    fn screen(app: &App<SimEnv>) -> String {
        draw_lines(80, 24, |frame| render(frame, app)).join("\n")
    }

    #[test]
    fn time_of_day_wraps_at_midnight() {
        assert_eq!(time_of_day(0), "00:00:00");
        assert_eq!(time_of_day(SECS_PER_DAY + 3_723), "01:02:03");
    }

    #[test]
    fn countdown_shows_minutes_and_seconds() {
        assert_eq!(countdown(119), "01:59");
        assert_eq!(countdown(0), "00:00");
    }

    #[test]
    fn full_screen_shows_every_panel() {
        let env = SimEnv::new();
        let mut app = connected_app(&env);
        receive(&mut app, "REMAINING:2");

        let screen = screen(&app);

        assert!(screen.contains("Visits: 3 / 5"));
        assert!(screen.contains("Visits ("));
        assert!(screen.contains("REMAINING:2"));
        assert!(screen.contains("Insight"));
        assert!(screen.contains("q quit"));
        assert!(screen.contains("Connected (/dev/ttyACM0)"));
    }

    #[test]
    fn lockout_shows_countdown() {
        let env = SimEnv::new();
        let mut app = connected_app(&env);
        let _ = app.apply_lock_duration(2);
        receive(&mut app, "LOCKED");

        env.advance(Duration::from_secs(61));
        let _ = app.handle(AppEvent::Tick);

        let screen = screen(&app);
        assert!(screen.contains("Gate: LOCKED"));
        assert!(screen.contains("Cooldown: 00:59"));
    }

    #[test]
    fn unsupported_platform_replaces_controls() {
        let env = SimEnv::new();
        let mut app = App::new(env, SessionConfig::default());
        let _ = app.handle(AppEvent::PlatformUnsupported);

        let screen = screen(&app);

        assert!(screen.contains("not supported"));
        assert!(!screen.contains("Visits"));
        assert!(!screen.contains("q quit"));
    }
}
