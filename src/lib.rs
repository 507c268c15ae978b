//! Autoservice TUI - employee filtering for the repair shop's workshop page.
//!
//! The page is modelled explicitly in [`view`]; [`sync`] keeps it in step
//! with the filter controls and the employees endpoint, and [`app`] plus
//! [`ui`] adapt it to the terminal.

pub mod api;
pub mod app;
pub mod config;
pub mod csrf;
pub mod filter;
pub mod logging;
pub mod render;
pub mod repair;
pub mod sanitize;
pub mod session;
pub mod sync;
pub mod ui;
pub mod view;
