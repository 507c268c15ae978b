//! Markup rendering for the employees results container.
//!
//! Pure functions: records and selection in, HTML out. Every server-provided
//! string goes through `escape_html` before it is embedded.

use crate::api::EmployeeRecord;
use crate::repair::RepairOption;
use crate::sanitize::escape_html;
use crate::view::SelectionSet;

/// Advisory text attached to busy employees.
pub const BUSY_TOOLTIP: &str = "Busy with many repairs";

/// Notice shown when the filters match nobody.
pub const EMPTY_MESSAGE: &str = "No employees match the selected filters.";

/// Prefix of the error notice.
pub const ERROR_PREFIX: &str = "Failed to load employees";

/// Render the employee cards.
///
/// # Arguments
/// * `records` - Employees returned by the server, in display order
/// * `selection` - Identifiers whose checkbox is checked
///
/// # Returns
/// * `String` - Markup for the results container
///
/// # Details
/// Zero records render the empty-state notice and no checkboxes. A busy
/// employee's card gets a warning border, a tooltip on the checkbox and a
/// busy marker next to the repair count.
pub fn render_list(records: &[EmployeeRecord], selection: &SelectionSet) -> String {
    if records.is_empty() {
        return render_empty();
    }

    let cards: String = records
        .iter()
        .map(|record| render_card(record, selection.contains(&record.id)))
        .collect();

    format!("<div class=\"row\">{}</div>", cards)
}

fn render_card(record: &EmployeeRecord, checked: bool) -> String {
    let busy = record.availability.is_busy();
    let id = escape_html(record.id.as_str());

    let mut card_class = String::from("card employee-card");
    if busy {
        card_class.push_str(" border-warning");
    }
    if checked {
        card_class.push_str(" selected");
    }

    let tooltip = if busy {
        format!(
            " data-bs-toggle=\"tooltip\" data-bs-title=\"{}\"",
            escape_html(BUSY_TOOLTIP)
        )
    } else {
        String::new()
    };

    let (availability_class, marker) = if busy {
        ("availability-busy", "🔥")
    } else {
        ("availability-free", "✅")
    };

    format!(
        concat!(
            "<div class=\"col-md-4 mb-2\">",
            "<div class=\"{card_class}\"><div class=\"card-body p-2\"><div class=\"form-check\">",
            "<input class=\"form-check-input employee-checkbox\" type=\"checkbox\" ",
            "name=\"employee_ids\" value=\"{id}\" id=\"emp_{id}\"{checked}{tooltip}>",
            "<label class=\"form-check-label w-100\" for=\"emp_{id}\">",
            "<div class=\"fw-bold\">{name}</div>",
            "<div class=\"small text-muted\">",
            "<div>{position}</div>",
            "<div>Experience: {experience}</div>",
            "<div>Schedule: {schedule}</div>",
            "<div class=\"text-success\">Salary: {salary}</div>",
            "<div class=\"{availability_class}\">Active repairs: {repairs} {marker}</div>",
            "</div></label></div></div></div></div>"
        ),
        card_class = card_class,
        id = id,
        checked = if checked { " checked" } else { "" },
        tooltip = tooltip,
        name = escape_html(&record.full_name),
        position = escape_html(&record.position),
        experience = record.format_experience(),
        schedule = escape_html(&record.schedule),
        salary = escape_html(&record.formatted_salary),
        availability_class = availability_class,
        repairs = record.active_repairs_count,
        marker = marker,
    )
}

/// Empty-state notice.
pub fn render_empty() -> String {
    format!(
        "<div class=\"alert alert-warning\"><i class=\"bi bi-exclamation-triangle\"></i> {}</div>",
        EMPTY_MESSAGE
    )
}

/// Error notice with the escaped error text.
pub fn render_error(message: &str) -> String {
    format!(
        concat!(
            "<div class=\"alert alert-danger\">",
            "<i class=\"bi bi-exclamation-triangle\"></i> {}: {}</div>"
        ),
        ERROR_PREFIX,
        escape_html(message)
    )
}

/// Text of the result-count label.
pub fn count_label(count: usize) -> String {
    format!("Employees found: {}", count)
}

/// Details panel of the chosen repair.
///
/// # Returns
/// * `Option<String>` - Panel markup, or None when no repair is chosen and
///   the panel stays hidden
pub fn render_repair_details(repair: Option<&RepairOption>) -> Option<String> {
    let repair = repair?;
    Some(format!(
        concat!(
            "<div><strong>Car:</strong> {car}</div>",
            "<div><strong>Description:</strong> {description}</div>",
            "<div><strong>Labour cost:</strong> {cost} ₽</div>"
        ),
        car = escape_html(&repair.car),
        description = escape_html(&repair.description),
        cost = format_cost(repair.cost),
    ))
}

/// Format an amount in the Russian locale style.
///
/// # Details
/// Digit groups are separated by a no-break space, the decimal separator
/// is a comma and at most three fraction digits are kept, trailing zeros
/// dropped. Non-finite amounts count as zero.
pub fn format_cost(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let millis = (amount.abs() * 1000.0).round() as u64;
    let whole = (millis / 1000).to_string();
    let fraction = millis % 1000;

    let mut formatted = String::new();
    if amount < 0.0 && millis > 0 {
        formatted.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            formatted.push('\u{a0}');
        }
        formatted.push(digit);
    }
    if fraction > 0 {
        formatted.push(',');
        formatted.push_str(format!("{:03}", fraction).trim_end_matches('0'));
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Availability, EmployeeId};

    const XSS: &str = "<script>alert(1)</script>";

    fn selection(ids: &[&str]) -> SelectionSet {
        ids.iter().map(|id| EmployeeId::new(*id)).collect()
    }

    #[test]
    fn test_render_empty_list() {
        let markup = render_list(&[], &SelectionSet::new());
        assert!(markup.contains(EMPTY_MESSAGE));
        assert!(!markup.contains("employee-checkbox"));
        assert!(!markup.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_render_one_card_per_record() {
        let records = vec![
            EmployeeRecord::sample("1", "Ivanov", Availability::Free),
            EmployeeRecord::sample("2", "Petrov", Availability::Busy),
        ];
        let markup = render_list(&records, &SelectionSet::new());
        assert_eq!(markup.matches("employee-checkbox").count(), 2);
        assert!(markup.contains("value=\"1\" id=\"emp_1\""));
        assert!(markup.contains("value=\"2\" id=\"emp_2\""));
        assert!(markup.contains("Experience: 5 years"));
        assert!(markup.contains("Salary: 55 000 ₽"));
    }

    #[test]
    fn test_render_busy_marker_and_tooltip() {
        let records = vec![
            EmployeeRecord::sample("1", "Free", Availability::Free),
            EmployeeRecord::sample("2", "Busy", Availability::Busy),
        ];
        let markup = render_list(&records, &SelectionSet::new());
        assert_eq!(markup.matches("border-warning").count(), 1);
        assert_eq!(markup.matches("data-bs-toggle=\"tooltip\"").count(), 1);
        assert!(markup.contains(BUSY_TOOLTIP));
        assert!(markup.contains("availability-busy\">Active repairs: 4 🔥"));
        assert!(markup.contains("availability-free\">Active repairs: 1 ✅"));
    }

    #[test]
    fn test_render_marks_selected_cards() {
        let records = vec![
            EmployeeRecord::sample("1", "A", Availability::Free),
            EmployeeRecord::sample("2", "B", Availability::Free),
        ];
        let markup = render_list(&records, &selection(&["2", "99"]));
        assert_eq!(markup.matches(" checked").count(), 1);
        assert!(markup.contains("id=\"emp_2\" checked"));
        assert_eq!(markup.matches("employee-card selected").count(), 1);
    }

    #[test]
    fn test_render_escapes_every_text_field() {
        let record = EmployeeRecord {
            id: EmployeeId::new(XSS),
            full_name: XSS.to_string(),
            position: XSS.to_string(),
            experience: 2,
            schedule: XSS.to_string(),
            formatted_salary: XSS.to_string(),
            availability: Availability::Busy,
            active_repairs_count: 3,
        };
        let markup = render_list(&[record], &SelectionSet::new());
        assert!(!markup.contains("<script>"));
        assert!(!markup.contains("</script>"));
        assert!(markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_render_error_escapes_message() {
        let markup = render_error(XSS);
        assert!(markup.contains(ERROR_PREFIX));
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_repair_details_hidden_without_choice() {
        assert!(render_repair_details(None).is_none());
    }

    #[test]
    fn test_repair_details_escape_text() {
        let repair = RepairOption {
            id: "7".to_string(),
            car: XSS.to_string(),
            description: "<img src=x onerror=alert(1)>".to_string(),
            cost: 1500.5,
        };
        let markup = render_repair_details(Some(&repair)).unwrap();
        assert!(!markup.contains("<script>"));
        assert!(!markup.contains("<img"));
        assert!(markup.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(markup.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(markup.contains("Labour cost:</strong> 1\u{a0}500,5 ₽"));
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.0), "0");
        assert_eq!(format_cost(950.0), "950");
        assert_eq!(format_cost(4500.0), "4\u{a0}500");
        assert_eq!(format_cost(1234567.891), "1\u{a0}234\u{a0}567,891");
        assert_eq!(format_cost(12.5), "12,5");
        assert_eq!(format_cost(0.12345), "0,123");
        assert_eq!(format_cost(-2000.0), "-2\u{a0}000");
        assert_eq!(format_cost(f64::NAN), "0");
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(3), "Employees found: 3");
    }
}
