use crate::error::{AnalyticsError, Failure};
use serde::{Deserialize, Serialize};

/// The state of one analysis unit in a report.
///
/// `Empty` means the inputs legitimately held no rows; `Failed` means the unit
/// could not be computed. Neither is ever collapsed into a zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    Empty,
    Failed(Failure),
}

impl<T> Outcome<T> {
    pub fn failed(error: &AnalyticsError) -> Self {
        Outcome::Failed(error.to_failure())
    }

    /// `EmptySample` becomes `Empty`; every other error becomes `Failed`.
    pub fn from_result(result: Result<T, AnalyticsError>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(AnalyticsError::EmptySample(_)) => Outcome::Empty,
            Err(error) => Outcome::failed(&error),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::Ready(f(value)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(failure) => Outcome::Failed(failure),
        }
    }

    /// Derives a dependent unit from this one, carrying `Empty` and `Failed` through.
    pub fn derive<U>(&self, f: impl FnOnce(&T) -> Result<U, AnalyticsError>) -> Outcome<U> {
        match self {
            Outcome::Ready(value) => Outcome::from_result(f(value)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(failure) => Outcome::Failed(failure.clone()),
        }
    }
}

impl<T> Outcome<Vec<T>> {
    /// `Ready` for a non-empty sequence, `Empty` otherwise.
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Ready(rows)
        }
    }

    /// The rows of a `Ready` sequence, or an empty slice.
    pub fn rows(&self) -> &[T] {
        match self {
            Outcome::Ready(rows) => rows,
            _ => &[],
        }
    }
}
