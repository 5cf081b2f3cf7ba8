use crate::error::DbError;
use crate::row::Row;
use async_trait::async_trait;

/// Read-only access to the persisted store by raw SQL text.
///
/// The analytics layer only ever talks to this trait, so the SQLite store can
/// be replaced with a scripted double in tests.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes a statement and returns every row in store order.
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError>;

    /// Returns the number of columns the statement projects, without running it.
    async fn projection_arity(&self, sql: &str) -> Result<usize, DbError>;
}
