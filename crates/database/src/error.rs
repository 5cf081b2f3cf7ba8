use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection settings: {0}")]
    ConnectionConfigError(String),

    #[error("Database operation failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Query '{0}' is not defined in the query catalog")]
    UnknownQuery(String),

    #[error("Invalid query catalog: {0}")]
    InvalidCatalog(String),

    #[error("Failed to read query catalog '{path}': {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Column {column} could not be decoded as {expected} (found {found})")]
    RowDecode {
        column: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Amount {0} cannot be stored as integer cents")]
    InvalidAmount(String),
}
