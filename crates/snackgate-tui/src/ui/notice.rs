//! Incompatibility notice
//!
//! Shown instead of the console when serial links are unavailable.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Render the notice over the whole area.
pub fn render(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::styled(
            "Serial links are not supported on this platform.",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
        Line::raw("The snack gate cannot be reached from here."),
        Line::raw("Run the console on a host with serial port access, or use --tcp with a serial bridge."),
        Line::raw(""),
        Line::styled("Press q to exit.", Style::default().fg(Color::DarkGray)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Snack gate "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
