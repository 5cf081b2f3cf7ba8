//! # Groupwise Database Crate
//!
//! This crate is the application's interface to the persisted sales store
//! (SQLite via `sqlx`). It is written once by ingestion and then only read.
//!
//! ## Public API
//!
//! - `connect` / `connect_in_memory`: establish the connection pool.
//! - `run_migrations`: create the `invoices` and `group_assignments` tables.
//! - `QueryCatalog`: named SQL text, loaded once at startup.
//! - `QueryExecutor`: the read-only seam the analytics layer depends on.
//! - `SalesRepository`: ingestion writes plus the SQLite `QueryExecutor`.
//! - `Row` / `Cell`: positional result rows.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod catalog;
pub mod connection;
pub mod error;
pub mod executor;
pub mod repository;
pub mod row;

// Re-export the key components to create a clean, public-facing API.
pub use catalog::QueryCatalog;
pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::DbError;
pub use executor::QueryExecutor;
pub use repository::SalesRepository;
pub use row::{Cell, Row};
