//! Search widget rendering.
//!
//! Displays the free-text search input bound to `searchInput`.

use crate::api::EmployeeSource;
use crate::app::{App, UiMode};
use crate::filter::FilterField;
use crate::session::SessionStore;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the search widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Displays the search input with its current value. Highlights when in
/// search mode and marks a pending debounced request.
pub fn render_search<S: EmployeeSource, M: SessionStore>(
    app: &App<S, M>,
    area: Rect,
    buf: &mut Buffer,
) {
    let is_active = app.mode == UiMode::Search;
    let prompt = if is_active {
        "Search: "
    } else {
        "Search (press '/'): "
    };

    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(Color::Yellow)),
        Span::styled(
            app.sync.page().controls.value(FilterField::Search),
            Style::default().fg(if is_active { Color::White } else { Color::Gray }),
        ),
        Span::styled(
            if is_active { "_" } else { "" },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            if app.sync.is_debounce_pending() { "  …" } else { "" },
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .style(if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            }),
    );

    Widget::render(paragraph, area, buf);
}
