//! Tabs widget rendering.
//!
//! Displays tab headers for switching between the list and the selection.

use crate::api::EmployeeSource;
use crate::app::{App, Tab};
use crate::session::SessionStore;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Render the tabs widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// Displays the tabs horizontally and highlights the active one. The
/// Selection tab label carries the number of checked employees.
pub fn render_tabs<S: EmployeeSource, M: SessionStore>(
    app: &App<S, M>,
    area: Rect,
    buf: &mut Buffer,
) {
    let selected = app.selected_employees().len();

    let mut spans = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let is_active = *tab == app.active_tab;
        let style = if is_active {
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        }

        let label = match tab {
            Tab::Selection => format!("{} ({})", tab.label(), selected),
            Tab::Employees => tab.label().to_string(),
        };
        let tab_text = if is_active {
            format!("▶ {} ◀", label)
        } else {
            format!("  {}  ", label)
        };
        spans.push(Span::styled(tab_text, style));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().title("Tabs (press Tab)").borders(Borders::ALL))
        .alignment(ratatui::layout::Alignment::Center);

    Widget::render(paragraph, area, buf);
}
