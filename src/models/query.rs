//! Query result models.
//!
//! This module defines the tabular result produced by the result marshaller and
//! the row-limit rules shared by every tool that returns rows.

use crate::db::value::CellValue;

/// Default row limit for query results.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Number of sample rows returned by describe_table.
pub const SAMPLE_ROW_LIMIT: usize = 5;

/// Resolve a caller-supplied limit. Absent or non-positive values fall back to the default.
pub fn effective_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(l) if l > 0 => usize::try_from(l).unwrap_or(usize::MAX),
        _ => DEFAULT_ROW_LIMIT,
    }
}

/// Bounded result of reading a cursor.
///
/// Every row holds exactly `columns.len()` cells. `truncated` is true iff the
/// cursor had at least one row beyond the applied limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub truncated: bool,
}

impl TabularResult {
    /// Number of rows held (never more than the applied limit).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render every cell with the display rule (`NULL` for nulls).
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }
}
