//! Autoservice TUI - Terminal client for filtering the repair shop's employees.
//!
//! Main entry point and event loop for the application.

use autoservice_tui::api::{EmployeeClient, EmployeeSource};
use autoservice_tui::app::{App, Tab, UiMode};
use autoservice_tui::config::Config;
use autoservice_tui::csrf::CsrfToken;
use autoservice_tui::session::{FileSessionStore, SessionStore, TabMemory};
use autoservice_tui::sync::FilterSync;
use autoservice_tui::{logging, ui};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
};
use std::io;
use std::time::{Duration, Instant};

/// Main application entry point.
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Loads configuration, sets up logging and session memory, issues the
/// initial employee query and runs the event loop.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; write a template on first run
    let config_path = Config::default_config_path()?;
    let config = Config::load(Some(&config_path))?;
    if !config_path.exists() {
        config.save(Some(&config_path))?;
    }

    let _log_guard = logging::init(&config.log_dir_path()?)?;
    tracing::info!(base_url = %config.base_url, "starting");

    let session = FileSessionStore::load(&config.session_file_path()?, config.session_ttl())?;
    let client = EmployeeClient::new(&config)?;
    let sync = FilterSync::new(client, config.debounce(), config.default_filters.clone());
    let token = CsrfToken::from_meta(config.csrf_token.as_deref());
    let mut app = App::new(
        sync,
        TabMemory::new(session),
        token,
        config.filter_options.clone(),
        config.repairs.clone(),
    );

    app.sync.refresh();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = app.tab_memory().store().save() {
        tracing::warn!(error = %e, "failed to save session");
    }

    result
}

/// Render the complete UI.
///
/// # Arguments
/// * `f` - Frame to render to
/// * `app` - Application state
///
/// # Details
/// Lays out tabs, search, filters, the active tab's body and the status bar.
fn render_ui<S: EmployeeSource, M: SessionStore>(f: &mut ratatui::Frame, app: &App<S, M>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(3), // Search bar
            Constraint::Length(4), // Filters
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    ui::render_tabs(app, chunks[0], f.buffer_mut());
    ui::render_search(app, chunks[1], f.buffer_mut());
    ui::render_filters(app, chunks[2], f.buffer_mut());

    match app.active_tab {
        Tab::Employees => ui::render_list(app, chunks[3], f.buffer_mut()),
        Tab::Selection => ui::render_selection(app, chunks[3], f.buffer_mut()),
    }

    let status_text = match &app.status_message {
        Some(message) => message.clone(),
        None => format!(
            "{} | 'q' quit, '/' search, 'f' filters, space select, 'r' reset, Tab switch tab",
            app.sync.page().count_label
        ),
    };
    let status = ratatui::widgets::Paragraph::new(ratatui::text::Line::from(status_text));
    f.render_widget(status, chunks[4]);
}

/// Main event loop.
///
/// # Arguments
/// * `terminal` - Terminal instance
/// * `app` - Application state
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Handles keyboard and mouse events, advances the debounce timer, applies
/// finished requests and renders the UI.
fn run_app<S: EmployeeSource, M: SessionStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S, M>,
) -> anyhow::Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| render_ui(f, app))?;

        // Short poll keeps the debounce timer and responses flowing
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let now = Instant::now();

                match app.mode {
                    UiMode::List => match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            break;
                        }
                        KeyCode::Up | KeyCode::Char('k') => match app.active_tab {
                            Tab::Employees => app.move_up(),
                            Tab::Selection => app.cycle_repair(false),
                        },
                        KeyCode::Down | KeyCode::Char('j') => match app.active_tab {
                            Tab::Employees => app.move_down(),
                            Tab::Selection => app.cycle_repair(true),
                        },
                        KeyCode::Char(' ') => {
                            if let Some(checked) = app.toggle_current() {
                                tracing::debug!(checked, "checkbox toggled");
                            }
                        }
                        KeyCode::Char('/') => app.mode = UiMode::Search,
                        KeyCode::Char('f') => app.mode = UiMode::Filters,
                        KeyCode::Char('r') => app.reset_filters(),
                        KeyCode::Tab => app.next_tab(),
                        _ => {}
                    },
                    UiMode::Search => match key.code {
                        KeyCode::Enter | KeyCode::Esc => app.mode = UiMode::List,
                        KeyCode::Backspace => app.remove_search_char(now),
                        KeyCode::Char(c) => app.add_search_char(c, now),
                        _ => {}
                    },
                    UiMode::Filters => match key.code {
                        KeyCode::Esc | KeyCode::Char('f') => app.mode = UiMode::List,
                        KeyCode::Up | KeyCode::Char('k') => app.focus_prev_filter(),
                        KeyCode::Down | KeyCode::Char('j') => app.focus_next_filter(),
                        KeyCode::Right | KeyCode::Char('l') => app.cycle_filter_option(true, now),
                        KeyCode::Left | KeyCode::Char('h') => app.cycle_filter_option(false, now),
                        KeyCode::Char('r') => app.reset_filters(),
                        _ => {}
                    },
                }
            }
            Event::Mouse(mouse) => handle_mouse_event(mouse, app),
            _ => {}
        }
    }

    Ok(())
}

/// Handle mouse scroll over the list.
fn handle_mouse_event<S: EmployeeSource, M: SessionStore>(
    mouse: MouseEvent,
    app: &mut App<S, M>,
) {
    if app.mode != UiMode::List || app.active_tab != Tab::Employees {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.move_up(),
        MouseEventKind::ScrollDown => app.move_down(),
        _ => {}
    }
}
