//! # Groupwise Ingestion
//!
//! Reads the invoices and experiment-assignment CSV files, drops rows that
//! are incomplete, unparseable or outside the analysis window, and replaces
//! the store's tables with the cleaned result.

pub mod cleaner;
pub mod error;
pub mod loader;
pub mod pipeline;

pub use cleaner::{clean_assignments, clean_invoices, CleaningRules, CleaningSummary};
pub use error::IngestError;
pub use loader::{read_assignments, read_invoices, RawAssignment, RawInvoice};
pub use pipeline::{ingest_files, IngestSummary};
