//! Filter criteria for the employee list.
//!
//! Holds the five filter fields and serializes the non-empty ones into the
//! query string sent to the filtering endpoint.

use serde::{Deserialize, Serialize};

/// One of the filter inputs on the employees page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    /// Free-text search over names
    Search,
    /// Position select
    Position,
    /// Experience bucket select
    Experience,
    /// Work schedule select
    Schedule,
    /// Availability select (free / busy)
    Availability,
}

impl FilterField {
    /// All fields in query-string order.
    pub const ALL: [FilterField; 5] = [
        FilterField::Search,
        FilterField::Position,
        FilterField::Experience,
        FilterField::Schedule,
        FilterField::Availability,
    ];

    /// The select fields, in the order they appear in the filters panel.
    pub const SELECTS: [FilterField; 4] = [
        FilterField::Position,
        FilterField::Experience,
        FilterField::Schedule,
        FilterField::Availability,
    ];

    /// Query parameter name.
    pub fn param(self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::Position => "position",
            FilterField::Experience => "experience",
            FilterField::Schedule => "schedule",
            FilterField::Availability => "availability",
        }
    }

    /// Identifier of the bound input control.
    pub fn control_id(self) -> &'static str {
        match self {
            FilterField::Search => "searchInput",
            FilterField::Position => "positionFilter",
            FilterField::Experience => "experienceFilter",
            FilterField::Schedule => "scheduleFilter",
            FilterField::Availability => "availabilityFilter",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Search => "Search",
            FilterField::Position => "Position",
            FilterField::Experience => "Experience",
            FilterField::Schedule => "Schedule",
            FilterField::Availability => "Availability",
        }
    }

    /// Whether edits to this field are debounced.
    pub fn is_free_text(self) -> bool {
        matches!(self, FilterField::Search)
    }
}

/// Option lists of the select controls, keyed by query parameter.
///
/// The "any" option (empty value) is implied and not listed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub position: Vec<String>,
    pub experience: Vec<String>,
    pub schedule: Vec<String>,
    pub availability: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        let owned =
            |values: &[&str]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };
        Self {
            position: owned(&["Механик", "Менеджер", "Электрик", "Слесарь", "Диагност"]),
            experience: owned(&["0-2", "3-5", "6-10", "10+"]),
            schedule: owned(&["5/2", "2/2"]),
            availability: owned(&["free", "busy"]),
        }
    }
}

impl FilterOptions {
    /// Values a select control cycles through, "any" first.
    /// Free-text fields have none.
    pub fn choices(&self, field: FilterField) -> Vec<&str> {
        let listed = match field {
            FilterField::Search => return Vec::new(),
            FilterField::Position => &self.position,
            FilterField::Experience => &self.experience,
            FilterField::Schedule => &self.schedule,
            FilterField::Availability => &self.availability,
        };
        std::iter::once("")
            .chain(listed.iter().map(String::as_str).filter(|v| !v.is_empty()))
            .collect()
    }
}

/// Current filter values. An empty field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub search: String,
    pub position: String,
    pub experience: String,
    pub schedule: String,
    pub availability: String,
}

impl FilterCriteria {
    /// Get a field value.
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Search => &self.search,
            FilterField::Position => &self.position,
            FilterField::Experience => &self.experience,
            FilterField::Schedule => &self.schedule,
            FilterField::Availability => &self.availability,
        }
    }

    /// Set a field value in place.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let slot = match field {
            FilterField::Search => &mut self.search,
            FilterField::Position => &mut self.position,
            FilterField::Experience => &mut self.experience,
            FilterField::Schedule => &mut self.schedule,
            FilterField::Availability => &mut self.availability,
        };
        *slot = value.into();
    }

    /// Clear every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether no field carries a constraint.
    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Name/value pairs for the non-empty fields.
    ///
    /// # Details
    /// Empty fields are omitted entirely: an empty filter means "no
    /// constraint", not "match the empty string".
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        FilterField::ALL
            .iter()
            .filter(|f| !self.get(**f).is_empty())
            .map(|f| (f.param(), self.get(*f)))
            .collect()
    }
}
