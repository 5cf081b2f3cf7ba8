//! # Groupwise Analytics Engine
//!
//! This crate turns the persisted sales snapshot into a statistical comparison
//! of the four experiment groups.
//!
//! ## Architectural Principles
//!
//! - **Store behind a trait:** all reads go through `database::QueryExecutor`
//!   using named catalog queries with declared projections.
//! - **Stateless calculation:** `StatisticsEngine` and `SignificanceEngine`
//!   are pure functions over decimal samples.
//! - **Best-effort reports:** every section of a `Report` is an `Outcome`, so
//!   "no data" and "could not compute" are explicit and never read as zero.
//!
//! ## Public API
//!
//! - `AggregationEngine`: rows to typed summaries.
//! - `StatisticsEngine`: descriptive statistics, z-scores, percentage change.
//! - `SignificanceEngine`: pairwise Welch t-tests.
//! - `ReportAssembler` / `Report`: the composed result.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod aggregation;
pub mod assembler;
pub mod error;
pub mod outcome;
pub mod queries;
pub mod report;
pub mod significance;
pub mod statistics;

pub use aggregation::AggregationEngine;
pub use assembler::ReportAssembler;
pub use error::{AnalyticsError, Failure, FailureKind};
pub use outcome::Outcome;
pub use report::{GroupStatistics, PercentageChanges, Report};
pub use significance::{SignificanceEngine, TTestResult, WelchStatistics};
pub use statistics::{DescriptiveStats, StatisticsEngine, ZScoreResult};
