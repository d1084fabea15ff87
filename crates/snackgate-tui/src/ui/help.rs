//! Key hints

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

const HINTS: &[(&str, &str)] = &[
    ("c/d", "link"),
    ("a/m/n", "mode"),
    ("o", "open"),
    ("u", "unlock"),
    ("+/-/l", "limit"),
    ("</>/t", "lock"),
    ("r", "clear"),
    ("i", "tip"),
    ("q", "quit"),
];

/// Render the key hint line.
pub fn render(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::with_capacity(HINTS.len() * 2);
    for (key, action) in HINTS {
        spans.push(Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow)));
        spans.push(Span::styled(format!(" {action}"), Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
