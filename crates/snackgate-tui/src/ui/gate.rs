//! Gate panel
//!
//! Mode, lock state, quota usage, lockout countdown and the pending drafts.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use snackgate_app::App;
use snackgate_core::Environment;

use super::countdown;

const LABEL_STYLE: Style = Style::new().fg(Color::DarkGray);

/// Render the gate panel.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let state = app.state();

    let gate = if state.is_locked() {
        Span::styled("LOCKED", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("UNLOCKED", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    };

    let usage_style = if state.count() >= state.limit().get() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let cooldown = if app.cooldown_armed() {
        Span::styled(countdown(app.cooldown_remaining_secs()), Style::default().fg(Color::Yellow))
    } else {
        Span::styled("idle", LABEL_STYLE)
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Mode: ", LABEL_STYLE),
            Span::styled(state.mode().as_str(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("   Gate: ", LABEL_STYLE),
            gate,
        ]),
        Line::from(vec![
            Span::styled("Visits: ", LABEL_STYLE),
            Span::styled(format!("{} / {}", state.count(), state.limit()), usage_style),
        ]),
        Line::from(vec![
            Span::styled("Lockout: ", LABEL_STYLE),
            Span::raw(format!("{} min", state.lock_duration_minutes())),
            Span::styled("   Cooldown: ", LABEL_STYLE),
            cooldown,
        ]),
        Line::from(vec![
            Span::styled("Draft limit: ", LABEL_STYLE),
            Span::raw(app.draft_limit().to_string()),
            Span::styled("   Draft lockout: ", LABEL_STYLE),
            Span::raw(format!("{} min", app.draft_lock_minutes())),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Gate "));

    frame.render_widget(paragraph, area);
}
