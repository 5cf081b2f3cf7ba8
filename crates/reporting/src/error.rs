use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportingError {
    #[error("Failed to write report file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
