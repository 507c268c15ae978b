//! View model of the employees page.
//!
//! Stands in for the page elements the filter loop binds to: the filter
//! controls, the results container, the count label and the tooltip
//! registry. The selection lives only here, as the checked state of the
//! cards in the results container.

use crate::api::{EmployeeId, EmployeeRecord};
use crate::filter::FilterField;
use crate::render;
use crate::sanitize::strip_dangerous;
use std::collections::{BTreeMap, BTreeSet};

/// Identifiers of checked employees.
pub type SelectionSet = BTreeSet<EmployeeId>;

/// Values currently shown in the filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterControls {
    values: BTreeMap<&'static str, String>,
}

impl FilterControls {
    /// Current value of a control. Unset controls read as empty.
    pub fn value(&self, field: FilterField) -> &str {
        self.values
            .get(field.control_id())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Handle user input into a control.
    ///
    /// # Returns
    /// * `String` - The value the control holds afterwards
    ///
    /// # Details
    /// Free-text controls are passed through `strip_dangerous` on every
    /// edit; select values are taken as-is.
    pub fn input(&mut self, field: FilterField, raw: &str) -> String {
        let value = if field.is_free_text() {
            strip_dangerous(raw)
        } else {
            raw.to_string()
        };
        self.values.insert(field.control_id(), value.clone());
        value
    }

    /// Set every control back to its empty/default value.
    pub fn clear(&mut self) {
        for field in FilterField::ALL {
            self.values.insert(field.control_id(), String::new());
        }
    }
}

/// One employee card in the results container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub record: EmployeeRecord,
    /// Checkbox state
    pub checked: bool,
    /// "selected" visual class on the card
    pub selected: bool,
}

/// Non-list content of the results container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The last query matched nobody
    Empty,
    /// The last query failed; holds the unescaped error text
    Error(String),
}

/// The results container (`employeesContainer`).
#[derive(Debug, Clone, Default)]
pub struct ResultsContainer {
    cards: Vec<Card>,
    notice: Option<Notice>,
    loading: bool,
}

impl ResultsContainer {
    pub const ID: &'static str = "employeesContainer";

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Scan the checked checkboxes.
    pub fn selection(&self) -> SelectionSet {
        self.cards
            .iter()
            .filter(|card| card.checked)
            .map(|card| card.record.id.clone())
            .collect()
    }

    /// Replace the content with freshly rendered, unchecked cards.
    ///
    /// # Details
    /// Drops any error notice. Zero records leave the empty-state notice.
    pub fn replace_list(&mut self, records: Vec<EmployeeRecord>) {
        self.notice = records.is_empty().then_some(Notice::Empty);
        self.cards = records
            .into_iter()
            .map(|record| Card {
                record,
                checked: false,
                selected: false,
            })
            .collect();
    }

    /// Check every card whose id is in `selection`.
    ///
    /// # Returns
    /// * `usize` - Number of cards re-checked; ids with no card are ignored
    pub fn restore_selection(&mut self, selection: &SelectionSet) -> usize {
        let mut restored = 0;
        for card in self.cards.iter_mut() {
            if selection.contains(&card.record.id) {
                card.checked = true;
                card.selected = true;
                restored += 1;
            }
        }
        restored
    }

    /// Show an error notice. Cards and their checked state are kept.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::Error(message.into()));
    }

    /// Change handler delegated from every checkbox in the container.
    ///
    /// # Returns
    /// * `bool` - False when no card carries `id`
    pub fn on_change(&mut self, id: &EmployeeId, checked: bool) -> bool {
        match self.cards.iter_mut().find(|card| &card.record.id == id) {
            Some(card) => {
                card.checked = checked;
                card.selected = checked;
                true
            }
            None => false,
        }
    }

    /// Flip the checkbox of the card at `index`.
    ///
    /// # Returns
    /// * `Option<bool>` - New checked state, or None if out of range
    pub fn toggle_at(&mut self, index: usize) -> Option<bool> {
        let card = self.cards.get(index)?;
        let id = card.record.id.clone();
        let checked = !card.checked;
        self.on_change(&id, checked);
        Some(checked)
    }

    /// Serialize the current content as markup.
    pub fn inner_html(&self) -> String {
        let mut html = String::new();
        if let Some(Notice::Error(message)) = &self.notice {
            html.push_str(&render::render_error(message));
        }
        if !self.cards.is_empty() {
            let records: Vec<EmployeeRecord> =
                self.cards.iter().map(|card| card.record.clone()).collect();
            html.push_str(&render::render_list(&records, &self.selection()));
        } else if self.notice == Some(Notice::Empty) {
            html.push_str(&render::render_empty());
        }
        html
    }
}

/// Tooltip registry for advisory annotations on cards.
#[derive(Debug, Clone, Default)]
pub struct Tooltips {
    anchors: BTreeMap<EmployeeId, &'static str>,
}

impl Tooltips {
    /// (Re)bind tooltips to the cards currently flagged busy.
    pub fn init(&mut self, container: &ResultsContainer) {
        self.anchors = container
            .cards()
            .iter()
            .filter(|card| card.record.availability.is_busy())
            .map(|card| (card.record.id.clone(), render::BUSY_TOOLTIP))
            .collect();
    }

    pub fn get(&self, id: &EmployeeId) -> Option<&'static str> {
        self.anchors.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Elements of the employees page the filter loop is bound to.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub controls: FilterControls,
    pub container: ResultsContainer,
    /// `employeesCount` label text
    pub count_label: String,
    pub tooltips: Tooltips,
}
