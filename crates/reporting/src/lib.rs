//! # Groupwise Reporting
//!
//! Presentation of an analytics `Report`: a Markdown document, a JSON export
//! and terminal tables. Sections that are empty or failed are rendered with a
//! visible placeholder, never dropped.

pub mod console;
pub mod error;
pub mod export;
mod format;
pub mod markdown;

pub use console::{group_table, print_summary, t_test_table};
pub use error::ReportingError;
pub use export::{write_json, write_markdown};
pub use markdown::render_markdown;
