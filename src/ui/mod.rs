//! UI components module.
//!
//! Contains ratatui widgets for displaying the employees page.

pub mod filters;
pub mod list;
pub mod search;
pub mod selection;
pub mod tabs;

pub use filters::render_filters;
pub use list::render_list;
pub use search::render_search;
pub use selection::render_selection;
pub use tabs::render_tabs;
