//! Insight panel

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use snackgate_app::App;
use snackgate_core::Environment;

/// Render the latest insight, or a hint for requesting one.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let line = if app.insight_pending() {
        Line::styled("Thinking...", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC))
    } else {
        match app.insight() {
            Some(text) => Line::raw(text.to_owned()),
            None => Line::styled("Press i for a tip", Style::default().fg(Color::DarkGray)),
        }
    };

    let paragraph =
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Insight ")).wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
