//! Forward-only row cursors.
//!
//! [`RowCursor`] is the seam between the engine and the result marshaller:
//! the marshaller only needs column names, the next row, and a way to check
//! whether one more row exists.

use crate::db::value::CellValue;
use crate::error::DbResult;
use duckdb::Rows;
use duckdb::types::Value;

pub trait RowCursor {
    /// Column names in result order.
    fn columns(&self) -> &[String];

    /// Decode the next row, or `None` once the cursor is exhausted.
    fn next_row(&mut self) -> DbResult<Option<Vec<CellValue>>>;

    /// Advance past one row without decoding it. Returns false when exhausted.
    fn skip_row(&mut self) -> DbResult<bool> {
        Ok(self.next_row()?.is_some())
    }
}

/// Cursor over a live DuckDB result.
pub struct DuckDbCursor<'stmt> {
    rows: Rows<'stmt>,
    columns: Vec<String>,
}

impl<'stmt> DuckDbCursor<'stmt> {
    pub fn new(rows: Rows<'stmt>) -> Self {
        let columns = rows
            .as_ref()
            .map(|stmt| stmt.column_names())
            .unwrap_or_default();
        Self { rows, columns }
    }
}

impl RowCursor for DuckDbCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> DbResult<Option<Vec<CellValue>>> {
        let width = self.columns.len();
        let Some(row) = self.rows.next()? else {
            return Ok(None);
        };
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            let value: Value = row.get(idx)?;
            cells.push(CellValue::from(value));
        }
        Ok(Some(cells))
    }

    fn skip_row(&mut self) -> DbResult<bool> {
        Ok(self.rows.next()?.is_some())
    }
}

/// In-memory cursor over pre-built rows.
#[derive(Debug, Clone, Default)]
pub struct VecCursor {
    columns: Vec<String>,
    rows: std::collections::VecDeque<Vec<CellValue>>,
}

impl VecCursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows: rows.into(),
        }
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowCursor for VecCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> DbResult<Option<Vec<CellValue>>> {
        Ok(self.rows.pop_front())
    }
}
