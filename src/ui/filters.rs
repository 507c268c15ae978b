//! Filters widget rendering.
//!
//! Displays the select filters and their current values.

use crate::api::EmployeeSource;
use crate::app::{App, UiMode};
use crate::filter::FilterField;
use crate::session::SessionStore;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the filters widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Shows every select on one line as `Label: value`, with "any" for an
/// empty value. In Filters mode the focused select is highlighted.
pub fn render_filters<S: EmployeeSource, M: SessionStore>(
    app: &App<S, M>,
    area: Rect,
    buf: &mut Buffer,
) {
    let is_active = app.mode == UiMode::Filters;
    let controls = &app.sync.page().controls;

    let mut spans = Vec::new();
    for (i, field) in FilterField::SELECTS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        }
        let value = controls.value(*field);
        let is_focused = is_active && app.focused_field() == *field;
        let value_style = if is_focused {
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else if value.is_empty() {
            Style::default().fg(Color::Gray)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(
            format!("{}: ", field.label()),
            Style::default().fg(Color::Cyan),
        ));
        spans.push(Span::styled(
            if value.is_empty() { "any" } else { value }.to_string(),
            value_style,
        ));
    }

    let mut lines = vec![Line::from(spans)];

    // Add instruction line when active
    if is_active {
        lines.push(Line::from(Span::styled(
            "Up/Down: choose filter, Left/Right: change value, 'r': reset, 'Esc' or 'f': exit",
            Style::default().fg(Color::Yellow),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(if is_active {
                "Filters (ACTIVE - press 'Esc' or 'f' to exit)"
            } else {
                "Filters (press 'f')"
            })
            .borders(Borders::ALL)
            .style(if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }),
    );

    Widget::render(paragraph, area, buf);
}
