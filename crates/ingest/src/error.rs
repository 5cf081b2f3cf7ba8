use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open input file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("User {0} has more than one group assignment")]
    DuplicateAssignment(i64),

    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
}
