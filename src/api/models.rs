//! Employee filter API models.
//!
//! Contains the employee record as returned by `/api/employees/filter` and the
//! response envelope around it.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Employee identifier.
///
/// The server sends integer ids, but string ids are accepted too; both are
/// normalized to their decimal/string form, which is also the checkbox value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Wire form of an id: number or string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiId {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ApiId::deserialize(deserializer)? {
            ApiId::Number(n) => EmployeeId(n.to_string()),
            ApiId::Text(s) => EmployeeId(s),
        })
    }
}

/// Whether an employee can take on more work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Free,
    /// Loaded with active repairs
    Busy,
}

impl Availability {
    pub fn is_busy(self) -> bool {
        self == Availability::Busy
    }
}

impl<'de> Deserialize<'de> for Availability {
    /// `"busy"` means busy; any other value counts as free.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("busy") => Availability::Busy,
            _ => Availability::Free,
        })
    }
}

/// One employee as rendered in the results list. Read-only on the client.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub full_name: String,
    pub position: String,
    /// Years of experience
    pub experience: u32,
    pub schedule: String,
    /// Pre-formatted salary, displayed as-is
    pub formatted_salary: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub active_repairs_count: u32,
}

impl EmployeeRecord {
    /// Format experience as "N year(s)".
    pub fn format_experience(&self) -> String {
        if self.experience == 1 {
            "1 year".to_string()
        } else {
            format!("{} years", self.experience)
        }
    }
}

/// Raw body of `/api/employees/filter`.
///
/// Success carries `employees` and `count`; failure carries `error`, with
/// any HTTP status.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub employees: Vec<EmployeeRecord>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successful filter result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPage {
    pub employees: Vec<EmployeeRecord>,
    /// Total reported by the server
    pub count: usize,
}

impl FilterPage {
    pub fn new(employees: Vec<EmployeeRecord>) -> Self {
        let count = employees.len();
        Self { employees, count }
    }
}

#[cfg(test)]
impl EmployeeRecord {
    /// Minimal record for tests.
    pub fn sample(id: &str, full_name: &str, availability: Availability) -> Self {
        Self {
            id: EmployeeId::new(id),
            full_name: full_name.to_string(),
            position: "Mechanic".to_string(),
            experience: 5,
            schedule: "5/2".to_string(),
            formatted_salary: "55 000 ₽".to_string(),
            availability,
            active_repairs_count: if availability.is_busy() { 4 } else { 1 },
        }
    }
}
