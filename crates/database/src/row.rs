use crate::error::DbError;
use rust_decimal::Decimal;

/// A single positional value returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    fn describe(&self) -> String {
        match self {
            Cell::Null => "NULL".to_string(),
            Cell::Integer(v) => format!("integer {v}"),
            Cell::Real(v) => format!("real {v}"),
            Cell::Text(v) => format!("text '{v}'"),
        }
    }
}

/// A fixed-arity result row. Columns are addressed by position only; the
/// caller is responsible for matching the query's declared projection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn cell(&self, column: usize, expected: &'static str) -> Result<&Cell, DbError> {
        self.cells.get(column).ok_or_else(|| DbError::RowDecode {
            column,
            expected,
            found: format!("a row of {} columns", self.cells.len()),
        })
    }

    pub fn text(&self, column: usize) -> Result<&str, DbError> {
        match self.cell(column, "text")? {
            Cell::Text(value) => Ok(value),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn integer(&self, column: usize) -> Result<i64, DbError> {
        match self.cell(column, "integer")? {
            Cell::Integer(value) => Ok(*value),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    /// Decodes an integer column of cents into a two-place decimal amount.
    pub fn cents(&self, column: usize) -> Result<Decimal, DbError> {
        match self.cell(column, "integer cents")? {
            Cell::Integer(cents) => Ok(Decimal::new(*cents, 2)),
            other => Err(mismatch(column, "integer cents", other)),
        }
    }

    /// Decodes a 0/1 integer column.
    pub fn flag(&self, column: usize) -> Result<bool, DbError> {
        match self.cell(column, "0/1 flag")? {
            Cell::Integer(0) => Ok(false),
            Cell::Integer(1) => Ok(true),
            other => Err(mismatch(column, "0/1 flag", other)),
        }
    }
}

fn mismatch(column: usize, expected: &'static str, found: &Cell) -> DbError {
    DbError::RowDecode {
        column,
        expected,
        found: found.describe(),
    }
}
