//! Repair choice on the assignment form.
//!
//! The form's repair select offers the shop's open repairs; choosing one
//! shows its car, description and labour cost next to the selection.

use serde::{Deserialize, Serialize};

/// One option of the repair select.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOption {
    pub id: String,
    #[serde(default)]
    pub car: String,
    #[serde(default)]
    pub description: String,
    /// Labour cost in rubles
    #[serde(default)]
    pub cost: f64,
}

/// The repair select and its current choice.
#[derive(Debug, Clone, Default)]
pub struct RepairSelect {
    options: Vec<RepairOption>,
    selected: Option<usize>,
}

impl RepairSelect {
    /// Name of the form field carrying the chosen repair.
    pub const FIELD: &'static str = "repair_id";

    pub fn new(options: Vec<RepairOption>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    pub fn options(&self) -> &[RepairOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&RepairOption> {
        self.selected.and_then(|index| self.options.get(index))
    }

    /// Id submitted with the form; empty when nothing is chosen.
    pub fn selected_id(&self) -> &str {
        self.selected().map(|repair| repair.id.as_str()).unwrap_or("")
    }

    /// Choose a repair by id.
    ///
    /// # Returns
    /// * `bool` - False when `id` matches no option; the choice is unchanged
    ///
    /// # Details
    /// An empty id clears the choice, which hides the details panel.
    pub fn select(&mut self, id: &str) -> bool {
        if id.is_empty() {
            self.selected = None;
            return true;
        }
        match self.options.iter().position(|repair| repair.id == id) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Step through "none" followed by every option.
    pub fn cycle(&mut self, forward: bool) {
        let slots = self.options.len() + 1;
        let current = self.selected.map_or(0, |index| index + 1);
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };
        self.selected = next.checked_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repairs() -> Vec<RepairOption> {
        vec![
            RepairOption {
                id: "12".to_string(),
                car: "Toyota A0012BC77".to_string(),
                description: "Brake pads".to_string(),
                cost: 4500.0,
            },
            RepairOption {
                id: "40".to_string(),
                car: "BMW A0040BC77".to_string(),
                description: "Timing belt".to_string(),
                cost: 12000.0,
            },
        ]
    }

    #[test]
    fn test_select_by_id() {
        let mut select = RepairSelect::new(repairs());
        assert!(select.selected().is_none());
        assert_eq!(select.selected_id(), "");

        assert!(select.select("40"));
        assert_eq!(select.selected().unwrap().description, "Timing belt");
        assert_eq!(select.selected_id(), "40");
    }

    #[test]
    fn test_select_empty_id_clears() {
        let mut select = RepairSelect::new(repairs());
        select.select("12");
        assert!(select.select(""));
        assert!(select.selected().is_none());
    }

    #[test]
    fn test_select_unknown_id_keeps_choice() {
        let mut select = RepairSelect::new(repairs());
        select.select("12");
        assert!(!select.select("999"));
        assert_eq!(select.selected_id(), "12");
    }

    #[test]
    fn test_cycle_passes_through_none() {
        let mut select = RepairSelect::new(repairs());
        select.cycle(true);
        assert_eq!(select.selected_id(), "12");
        select.cycle(true);
        assert_eq!(select.selected_id(), "40");
        select.cycle(true);
        assert_eq!(select.selected_id(), "");
        select.cycle(false);
        assert_eq!(select.selected_id(), "40");
    }

    #[test]
    fn test_cycle_without_options_stays_empty() {
        let mut select = RepairSelect::default();
        select.cycle(true);
        assert!(select.selected().is_none());
    }
}
