//! Employee list widget rendering.
//!
//! Displays the results container: employee cards with checkboxes, the
//! empty/error notices and the loading marker.

use crate::api::EmployeeSource;
use crate::app::App;
use crate::render::{BUSY_TOOLTIP, EMPTY_MESSAGE, ERROR_PREFIX};
use crate::session::SessionStore;
use crate::view::{Card, Notice};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

/// Lines per card: name, position, experience/schedule, salary, repairs, separator.
pub const LINES_PER_CARD: u16 = 6;

/// Render the employee list widget.
///
/// # Arguments
/// * `app` - Application state
/// * `area` - Area to render in
/// * `buf` - Buffer to render to
///
/// # Details
/// An error notice is drawn above the cards, which stay as they were. The
/// list scrolls to keep the cursor centered. Busy employees get a warning
/// color and a 🔥 marker.
pub fn render_list<S: EmployeeSource, M: SessionStore>(
    app: &App<S, M>,
    area: Rect,
    buf: &mut Buffer,
) {
    let page = app.sync.page();
    let container = &page.container;

    let area = match container.notice() {
        Some(Notice::Error(message)) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(area);
            let error = Paragraph::new(Line::from(Span::styled(
                format!("{}: {}", ERROR_PREFIX, message),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).style(Style::default().fg(Color::Red)));
            Widget::render(error, chunks[0], buf);
            chunks[1]
        }
        _ => area,
    };

    let cards = container.cards();
    let title = format!(
        "{}{}",
        if page.count_label.is_empty() {
            "Employees".to_string()
        } else {
            page.count_label.clone()
        },
        if container.is_loading() { " [loading…]" } else { "" }
    );

    // Handle empty list
    if cards.is_empty() {
        let message = match container.notice() {
            Some(Notice::Empty) => EMPTY_MESSAGE,
            _ if container.is_loading() => "Loading employees…",
            _ => "No employees to display",
        };
        let list = List::new(vec![ListItem::new(message)])
            .block(Block::default().title(title).borders(Borders::ALL));
        Widget::render(list, area, buf);
        return;
    }

    let selected_index = app.selected_index.min(cards.len().saturating_sub(1));

    let separator_width = area.width.saturating_sub(2).max(10) as usize;
    let separator_line = "─".repeat(separator_width);

    // Calculate scroll offset to keep the cursor centered
    let available_height = area.height.saturating_sub(2);
    let visible_cards = (available_height / LINES_PER_CARD).max(1) as usize;
    let center_offset = visible_cards / 2;
    let max_scroll = cards.len().saturating_sub(visible_cards);
    let scroll_offset = selected_index.saturating_sub(center_offset).min(max_scroll);
    let end_idx = (scroll_offset + visible_cards).min(cards.len());

    let items: Vec<ListItem> = cards[scroll_offset..end_idx]
        .iter()
        .enumerate()
        .map(|(offset, card)| {
            let is_cursor = scroll_offset + offset == selected_index;
            card_item(card, is_cursor, &separator_line)
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index - scroll_offset));

    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD));

    StatefulWidget::render(list, area, buf, &mut list_state);
}

fn card_item<'a>(card: &'a Card, is_cursor: bool, separator: &str) -> ListItem<'a> {
    let record = &card.record;
    let busy = record.availability.is_busy();

    let checkbox = if card.checked { "[x] " } else { "[ ] " };
    let name_style = Style::default()
        .fg(if is_cursor {
            Color::Yellow
        } else if card.selected {
            Color::Green
        } else {
            Color::White
        })
        .add_modifier(Modifier::BOLD);

    let mut line1 = vec![
        Span::styled(checkbox, Style::default().fg(Color::Cyan)),
        Span::styled(record.full_name.as_str(), name_style),
    ];
    if busy && is_cursor {
        line1.push(Span::styled(
            format!("  ({})", BUSY_TOOLTIP),
            Style::default().fg(Color::Yellow),
        ));
    }

    let line2 = Line::from(Span::styled(
        format!("    {}", record.position),
        Style::default().fg(Color::Cyan),
    ));
    let line3 = Line::from(Span::styled(
        format!(
            "    Experience: {} · Schedule: {}",
            record.format_experience(),
            record.schedule
        ),
        Style::default().fg(Color::Gray),
    ));
    let line4 = Line::from(Span::styled(
        format!("    Salary: {}", record.formatted_salary),
        Style::default().fg(Color::Green),
    ));
    let line5 = Line::from(Span::styled(
        format!(
            "    Active repairs: {} {}",
            record.active_repairs_count,
            if busy { "🔥" } else { "✅" }
        ),
        Style::default().fg(if busy { Color::LightRed } else { Color::Green }),
    ));
    let line6 = Line::from(Span::styled(
        separator.to_string(),
        Style::default().fg(if busy { Color::Yellow } else { Color::DarkGray }),
    ));

    ListItem::new(vec![Line::from(line1), line2, line3, line4, line5, line6])
}
