use core_types::GroupLabel;
use database::DbError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Query '{0}' is not defined in the query catalog")]
    UnknownQuery(String),

    #[error("Query '{query}' failed: {source}")]
    QueryExecution {
        query: String,
        #[source]
        source: DbError,
    },

    #[error("Not enough data to perform calculation: {0} has no samples")]
    EmptySample(String),

    #[error("Missing sample data for group(s): {}", join_groups(.0))]
    MissingGroupData(Vec<GroupLabel>),

    #[error("Query '{query}' projects {actual} columns, expected {expected}")]
    ProjectionMismatch {
        query: String,
        expected: usize,
        actual: usize,
    },

    #[error("Error in calculation: {0}")]
    Calculation(String),
}

fn join_groups(groups: &[GroupLabel]) -> String {
    groups
        .iter()
        .map(GroupLabel::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Category of a failure recorded inside a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownQuery,
    QueryExecution,
    EmptySample,
    MissingGroupData,
    ProjectionMismatch,
    Calculation,
}

/// A serialisable snapshot of an `AnalyticsError`, kept in the report when a
/// single analysis unit could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    /// Groups lacking data, for `MissingGroupData`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupLabel>,
}

impl AnalyticsError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalyticsError::UnknownQuery(_) => FailureKind::UnknownQuery,
            AnalyticsError::QueryExecution { .. } => FailureKind::QueryExecution,
            AnalyticsError::EmptySample(_) => FailureKind::EmptySample,
            AnalyticsError::MissingGroupData(_) => FailureKind::MissingGroupData,
            AnalyticsError::ProjectionMismatch { .. } => FailureKind::ProjectionMismatch,
            AnalyticsError::Calculation(_) => FailureKind::Calculation,
        }
    }

    pub fn to_failure(&self) -> Failure {
        let groups = match self {
            AnalyticsError::MissingGroupData(groups) => groups.clone(),
            _ => Vec::new(),
        };
        Failure {
            kind: self.kind(),
            message: self.to_string(),
            groups,
        }
    }
}
