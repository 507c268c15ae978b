//! Application state management.
//!
//! Terminal-side adapter around `FilterSync`: input modes, cursor, tabs,
//! the page's forms and the status line.

use crate::api::{EmployeeRecord, EmployeeSource};
use crate::csrf::{CsrfToken, Form, inject_csrf};
use crate::filter::{FilterField, FilterOptions};
use crate::render::ERROR_PREFIX;
use crate::repair::{RepairOption, RepairSelect};
use crate::session::{SessionStore, TabMemory};
use crate::sync::{FilterSync, Outcome};
use std::time::Instant;
use tracing::debug;

/// Id of the repair-assignment form.
pub const ASSIGN_FORM_ID: &str = "assignEmployees";

/// Field name carrying the checked employees on submission.
pub const EMPLOYEE_IDS_FIELD: &str = "employee_ids";

/// Application state and UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Normal list view
    List,
    /// Typing into the search field
    Search,
    /// Editing the select filters
    Filters,
}

/// Tabs of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Filters and the employee list
    Employees,
    /// Checked employees and the assignment form
    Selection,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Employees, Tab::Selection];

    /// Identifier stored in session memory.
    pub fn id(self) -> &'static str {
        match self {
            Tab::Employees => "employees-tab",
            Tab::Selection => "selection-tab",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Tab::ALL.into_iter().find(|tab| tab.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Employees => "Employees",
            Tab::Selection => "Selection",
        }
    }

    fn next(self) -> Self {
        match self {
            Tab::Employees => Tab::Selection,
            Tab::Selection => Tab::Employees,
        }
    }
}

/// Main application state.
#[derive(Debug)]
pub struct App<S: EmployeeSource, M: SessionStore> {
    /// Filter loop and the page it renders into
    pub sync: FilterSync<S>,
    /// Current UI mode
    pub mode: UiMode,
    /// Active tab
    pub active_tab: Tab,
    /// Cursor position in the employee list
    pub selected_index: usize,
    /// Focused select in Filters mode (index into `FilterField::SELECTS`)
    pub focused_filter: usize,
    /// Forms on the page, CSRF field already injected
    pub forms: Vec<Form>,
    /// Status message to display
    pub status_message: Option<String>,
    /// Option lists of the select filters
    pub filter_options: FilterOptions,
    /// Repair chosen for the assignment form
    pub repairs: RepairSelect,
    tab_memory: TabMemory<M>,
}

impl<S: EmployeeSource, M: SessionStore> App<S, M> {
    /// Create the application state.
    ///
    /// # Arguments
    /// * `sync` - Filter loop bound to the page
    /// * `tab_memory` - Session memory of the last active tab
    /// * `csrf_token` - Page CSRF token, if the application issued one
    /// * `filter_options` - Option lists of the select filters
    /// * `repairs` - Repairs offered by the assignment form
    ///
    /// # Details
    /// Injects the token into the page's POST forms and restores the last
    /// active tab. Both happen only here.
    pub fn new(
        sync: FilterSync<S>,
        tab_memory: TabMemory<M>,
        csrf_token: Option<CsrfToken>,
        filter_options: FilterOptions,
        repairs: Vec<RepairOption>,
    ) -> Self {
        let mut assign = Form::new(ASSIGN_FORM_ID, "POST");
        assign.set_field(RepairSelect::FIELD, "");
        let mut forms = vec![Form::new("employeeFilters", "GET"), assign];
        let injected = inject_csrf(&mut forms, csrf_token.as_ref());
        debug!(injected, "csrf token injected");

        let active_tab = tab_memory
            .restore()
            .and_then(|id| Tab::from_id(&id))
            .unwrap_or(Tab::Employees);

        Self {
            sync,
            mode: UiMode::List,
            active_tab,
            selected_index: 0,
            focused_filter: 0,
            forms,
            status_message: None,
            filter_options,
            repairs: RepairSelect::new(repairs),
            tab_memory,
        }
    }

    pub fn tab_memory(&self) -> &TabMemory<M> {
        &self.tab_memory
    }

    /// Advance timers and apply finished requests.
    ///
    /// # Details
    /// Called once per event-loop iteration. Failures are mirrored into the
    /// status line; the cursor is clamped to the new list.
    pub fn tick(&mut self, now: Instant) {
        self.sync.poll_timers(now);
        for outcome in self.sync.poll_completions() {
            match outcome {
                Outcome::Rendered { .. } => self.clear_status(),
                Outcome::Failed(message) => {
                    self.set_status(format!("{}: {}", ERROR_PREFIX, message))
                }
                Outcome::Stale { .. } => {}
            }
        }
        self.clamp_cursor();
    }

    fn card_count(&self) -> usize {
        self.sync.page().container.cards().len()
    }

    fn clamp_cursor(&mut self) {
        self.selected_index = self
            .selected_index
            .min(self.card_count().saturating_sub(1));
    }

    /// Move the cursor up, wrapping to the bottom.
    pub fn move_up(&mut self) {
        let len = self.card_count();
        if len == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = len - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Move the cursor down, wrapping to the top.
    pub fn move_down(&mut self) {
        let len = self.card_count();
        if len == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % len;
    }

    /// Employee under the cursor.
    pub fn current_employee(&self) -> Option<&EmployeeRecord> {
        self.sync
            .page()
            .container
            .cards()
            .get(self.selected_index)
            .map(|card| &card.record)
    }

    /// Advisory tooltip of the employee under the cursor.
    pub fn current_tooltip(&self) -> Option<&'static str> {
        let employee = self.current_employee()?;
        self.sync.page().tooltips.get(&employee.id)
    }

    /// Toggle the checkbox under the cursor.
    pub fn toggle_current(&mut self) -> Option<bool> {
        let index = self.selected_index;
        self.sync.page_mut().container.toggle_at(index)
    }

    /// Checked employees in list order.
    pub fn selected_employees(&self) -> Vec<&EmployeeRecord> {
        self.sync
            .page()
            .container
            .cards()
            .iter()
            .filter(|card| card.checked)
            .map(|card| &card.record)
            .collect()
    }

    /// Fields the assignment form would submit for the current selection.
    pub fn assignment_submission(&self) -> Vec<(String, String)> {
        let Some(form) = self.forms.iter().find(|form| form.id == ASSIGN_FORM_ID) else {
            return Vec::new();
        };
        let selected = self.selected_employees();
        form.submission(
            EMPLOYEE_IDS_FIELD,
            selected.iter().map(|employee| employee.id.as_str()),
        )
    }

    /// Append a character to the search field.
    pub fn add_search_char(&mut self, ch: char, now: Instant) {
        if self.mode == UiMode::Search {
            let mut value = self.sync.page().controls.value(FilterField::Search).to_string();
            value.push(ch);
            self.sync.update_field(FilterField::Search, &value, now);
        }
    }

    /// Remove the last character of the search field.
    pub fn remove_search_char(&mut self, now: Instant) {
        if self.mode == UiMode::Search {
            let mut value = self.sync.page().controls.value(FilterField::Search).to_string();
            if value.pop().is_some() {
                self.sync.update_field(FilterField::Search, &value, now);
            }
        }
    }

    /// Select field focused in Filters mode.
    pub fn focused_field(&self) -> FilterField {
        FilterField::SELECTS[self.focused_filter % FilterField::SELECTS.len()]
    }

    /// Move focus to the next select.
    pub fn focus_next_filter(&mut self) {
        self.focused_filter = (self.focused_filter + 1) % FilterField::SELECTS.len();
    }

    /// Move focus to the previous select.
    pub fn focus_prev_filter(&mut self) {
        let len = FilterField::SELECTS.len();
        self.focused_filter = (self.focused_filter + len - 1) % len;
    }

    /// Choose the next (or previous) option of the focused select.
    ///
    /// # Details
    /// A value not among the options (e.g. from config) restarts at "any".
    pub fn cycle_filter_option(&mut self, forward: bool, now: Instant) {
        let field = self.focused_field();
        let choices = self.filter_options.choices(field);
        let current = self.sync.page().controls.value(field);
        let next = match choices.iter().position(|choice| *choice == current) {
            Some(pos) if forward => (pos + 1) % choices.len(),
            Some(pos) => (pos + choices.len() - 1) % choices.len(),
            None => 0,
        };
        self.sync.update_field(field, choices[next], now);
    }

    /// Choose the assignment form's repair by id. An empty id clears it.
    ///
    /// # Returns
    /// * `bool` - False when no repair carries `id`
    pub fn select_repair(&mut self, id: &str) -> bool {
        let changed = self.repairs.select(id);
        self.sync_repair_field();
        changed
    }

    /// Step the repair choice forward or back.
    pub fn cycle_repair(&mut self, forward: bool) {
        self.repairs.cycle(forward);
        self.sync_repair_field();
    }

    fn sync_repair_field(&mut self) {
        let id = self.repairs.selected_id().to_string();
        if let Some(form) = self.forms.iter_mut().find(|form| form.id == ASSIGN_FORM_ID) {
            form.set_field(RepairSelect::FIELD, &id);
        }
    }

    /// Clear all filters and reload.
    pub fn reset_filters(&mut self) {
        self.sync.reset();
        self.selected_index = 0;
        self.set_status("Filters reset".to_string());
    }

    /// Switch to a tab and remember it for the session.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.tab_memory.remember(tab.id());
    }

    /// Switch to the other tab.
    pub fn next_tab(&mut self) {
        self.switch_tab(self.active_tab.next());
    }

    /// Set status message.
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    /// Clear status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
