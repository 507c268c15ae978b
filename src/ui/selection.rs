//! Selection tab rendering.
//!
//! Lists the checked employees and previews what the assignment form
//! would submit.

use crate::api::EmployeeSource;
use crate::app::App;
use crate::csrf::CSRF_FIELD;
use crate::render::format_cost;
use crate::session::SessionStore;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Render the selection tab.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// The chosen repair's details are shown only while a repair is chosen.
/// The CSRF value is masked in the form preview.
pub fn render_selection<S: EmployeeSource, M: SessionStore>(
    app: &App<S, M>,
    area: Rect,
    buf: &mut Buffer,
) {
    let selected = app.selected_employees();
    let mut lines = Vec::new();

    if selected.is_empty() {
        lines.push(Line::from(Span::styled(
            "No employees selected. Press space on the Employees tab to select.",
            Style::default().fg(Color::Gray),
        )));
    }
    for employee in &selected {
        lines.push(Line::from(vec![
            Span::styled(
                employee.full_name.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} · {}", employee.position, employee.schedule),
                Style::default().fg(Color::Cyan),
            ),
        ]));
    }

    lines.push(Line::from(""));
    match app.repairs.selected() {
        Some(repair) => {
            lines.push(Line::from(vec![
                Span::styled("Repair: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("#{}", repair.id),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
            ]));
            let detail_style = Style::default().fg(Color::Cyan);
            lines.push(Line::from(Span::styled(format!("  Car: {}", repair.car), detail_style)));
            lines.push(Line::from(Span::styled(
                format!("  Description: {}", repair.description),
                detail_style,
            )));
            lines.push(Line::from(Span::styled(
                format!("  Labour cost: {} ₽", format_cost(repair.cost)),
                Style::default().fg(Color::Green),
            )));
        }
        None if app.repairs.options().is_empty() => {
            lines.push(Line::from(Span::styled(
                "No repairs available.",
                Style::default().fg(Color::Gray),
            )));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No repair chosen. Up/Down to choose one.",
                Style::default().fg(Color::Gray),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Assignment form:",
        Style::default().fg(Color::Yellow),
    )));
    for (name, value) in app.assignment_submission() {
        let shown = if name == CSRF_FIELD {
            "•".repeat(value.len().min(8))
        } else {
            value
        };
        lines.push(Line::from(Span::styled(
            format!("  {} = {}", name, shown),
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(format!("Selected employees ({})", selected.len()))
                .borders(Borders::ALL),
        );

    Widget::render(paragraph, area, buf);
}
