//! History panels
//!
//! Recorded visits and the diagnostic log, both newest first.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use snackgate_app::App;
use snackgate_core::Environment;

use super::time_of_day;

const OUTBOUND_PREFIX: &str = "> ";

/// Render the visit list.
pub fn render_visits<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(" Visits ({}) ", app.visits().len()));

    let items: Vec<ListItem> = if app.visits().len() == 0 {
        vec![ListItem::new(Line::from(Span::styled("No visits yet", Style::default().fg(Color::DarkGray))))]
    } else {
        app.visits()
            .map(|visit| {
                ListItem::new(Line::from(vec![
                    Span::styled(time_of_day(visit.timestamp), Style::default().fg(Color::DarkGray)),
                    Span::raw(format!("  #{}", visit.count_at_visit)),
                ]))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}

/// Render the diagnostic log.
pub fn render_log<E: Environment>(frame: &mut Frame, app: &App<E>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Log ");

    let items: Vec<ListItem> = app
        .log_entries()
        .map(|entry| {
            let style = if entry.text.starts_with(OUTBOUND_PREFIX) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(time_of_day(entry.timestamp), Style::default().fg(Color::DarkGray)),
                Span::raw(" "),
                Span::styled(entry.text.clone(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
