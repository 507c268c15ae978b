//! Employee API integration module.
//!
//! Provides the client for the shop's employee filtering endpoint.

pub mod client;
pub mod models;

pub use client::{EmployeeClient, EmployeeSource, FetchError};
pub use models::{Availability, EmployeeId, EmployeeRecord, FilterPage};
