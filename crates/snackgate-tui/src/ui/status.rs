//! Status bar
//!
//! Displays connection status and the latest status message.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use snackgate_app::{App, ConnectionState};
use snackgate_core::Environment;

/// Render the status bar.
pub fn render<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Unsupported => Span::styled("Unsupported", Style::default().fg(Color::Red)),
        ConnectionState::Disconnected => Span::styled("Disconnected", Style::default().fg(Color::Red)),
        ConnectionState::Connecting => Span::styled("Connecting...", Style::default().fg(Color::Yellow)),
        ConnectionState::Connected { port } => Span::styled(
            format!("Connected ({port})"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let message = app.status_message().map_or_else(String::new, |message| format!(" | {message}"));

    let status_line = Line::from(vec![Span::raw(" "), connection_status, Span::raw(message)]);

    let paragraph = Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use snackgate_app::{AppEvent, Intent, SessionConfig};
    use snackgate_harness::SimEnv;
    use snackgate_proto::Command;

    use super::*;
    use crate::ui::tests::{connected_app, draw_lines};

    fn status_bar(app: &App<SimEnv>) -> String {
        draw_lines(60, 1, |frame| render(frame, app, frame.area()))[0].trim().to_owned()
    }

    #[test]
    fn rejected_command_while_disconnected() {
        let mut app = App::new(SimEnv::new(), SessionConfig::default());
        let _ = app.perform(Intent::Send(Command::Open));

        insta::assert_snapshot!(status_bar(&app), @"Disconnected | Not connected: OPEN not sent");
    }

    #[test]
    fn connected_port_and_lock_message() {
        let env = SimEnv::new();
        let mut app = connected_app(&env);
        let _ = app.handle(AppEvent::BytesReceived(b"LOCKED\n".to_vec()));

        insta::assert_snapshot!(status_bar(&app), @"Connected (/dev/ttyACM0) | Gate locked");
    }

    #[test]
    fn link_loss_reason() {
        let env = SimEnv::new();
        let mut app = connected_app(&env);
        let _ = app.handle(AppEvent::Disconnected { reason: Some("read failed: EIO".into()) });

        assert_eq!(status_bar(&app), "Disconnected | Link lost: read failed: EIO");
    }
}
