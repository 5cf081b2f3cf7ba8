use crate::error::DbError;
use crate::executor::QueryExecutor;
use crate::row::{Cell, Row};
use async_trait::async_trait;
use core_types::{to_cents, GroupAssignment, SalesRecord};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Executor, Row as _, TypeInfo, ValueRef};

/// The `SalesRepository` is the application's interface to the sales store.
/// It owns every write (ingestion) and executes named catalog queries.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    /// Creates a new `SalesRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Replaces the full contents of the `invoices` table in one transaction.
    pub async fn replace_sales(&self, records: &[SalesRecord]) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;
        let written = write_sales(&mut tx, records).await?;
        tx.commit().await?;
        tracing::info!(rows = written, "Replaced invoices table.");
        Ok(written)
    }

    /// Replaces the full contents of the `group_assignments` table in one transaction.
    ///
    /// A second assignment for the same user violates the primary key and
    /// rolls the whole load back.
    pub async fn replace_assignments(&self, assignments: &[GroupAssignment]) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;
        let written = write_assignments(&mut tx, assignments).await?;
        tx.commit().await?;
        tracing::info!(rows = written, "Replaced group_assignments table.");
        Ok(written)
    }

    /// Replaces both tables atomically, so a report never sees invoices from
    /// one load joined against assignments from another.
    pub async fn replace_snapshot(
        &self,
        records: &[SalesRecord],
        assignments: &[GroupAssignment],
    ) -> Result<(u64, u64), DbError> {
        let mut tx = self.pool.begin().await?;
        let sales = write_sales(&mut tx, records).await?;
        let groups = write_assignments(&mut tx, assignments).await?;
        tx.commit().await?;
        tracing::info!(invoices = sales, assignments = groups, "Replaced sales snapshot.");
        Ok((sales, groups))
    }

    pub async fn count_sales(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl QueryExecutor for SalesRepository {
    async fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DbError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn projection_arity(&self, sql: &str) -> Result<usize, DbError> {
        let description = (&self.pool).describe(sql).await?;
        Ok(description.columns().len())
    }
}

async fn write_sales(conn: &mut SqliteConnection, records: &[SalesRecord]) -> Result<u64, DbError> {
    sqlx::query("DELETE FROM invoices").execute(&mut *conn).await?;

    for record in records {
        let cents = to_cents(record.amount)
            .ok_or_else(|| DbError::InvalidAmount(record.amount.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO invoices (user_id, paid_at, event_id, amount_cents, product_name)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(record.user_id)
        .bind(record.paid_at.format("%Y-%m-%d").to_string())
        .bind(record.event_id)
        .bind(cents)
        .bind(record.product_name.as_str())
        .execute(&mut *conn)
        .await?;
    }
    Ok(records.len() as u64)
}

async fn write_assignments(
    conn: &mut SqliteConnection,
    assignments: &[GroupAssignment],
) -> Result<u64, DbError> {
    sqlx::query("DELETE FROM group_assignments").execute(&mut *conn).await?;

    for assignment in assignments {
        sqlx::query("INSERT INTO group_assignments (user_id, ui_change, desc_change) VALUES (?1, ?2, ?3)")
            .bind(assignment.user_id)
            .bind(i64::from(assignment.ui_change))
            .bind(i64::from(assignment.desc_change))
            .execute(&mut *conn)
            .await?;
    }
    Ok(assignments.len() as u64)
}

/// Converts a driver row into positional cells using each value's storage class.
fn decode_row(row: &SqliteRow) -> Result<Row, DbError> {
    let mut cells = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        let (is_null, storage_class) = {
            let raw = row.try_get_raw(index)?;
            (raw.is_null(), raw.type_info().name().to_string())
        };
        let cell = if is_null {
            Cell::Null
        } else {
            match storage_class.as_str() {
                "INTEGER" | "BOOLEAN" => Cell::Integer(row.try_get::<i64, _>(index)?),
                "REAL" | "NUMERIC" => Cell::Real(row.try_get::<f64, _>(index)?),
                _ => Cell::Text(row.try_get::<String, _>(index)?),
            }
        };
        cells.push(cell);
    }
    Ok(Row::new(cells))
}
