//! Result marshalling.
//!
//! Reads a cursor into a bounded [`TabularResult`]. After `limit` rows are
//! taken the cursor is advanced exactly once more to learn whether anything
//! was left behind, so `truncated` never needs a separate count query.

use crate::db::cursor::RowCursor;
use crate::error::{DbError, DbResult};
use crate::models::TabularResult;
use tracing::debug;

/// Drain at most `limit` rows from `cursor`.
///
/// A `limit` of zero is treated as one; use
/// [`effective_limit`](crate::models::effective_limit) to resolve caller input first.
pub fn marshal(cursor: &mut dyn RowCursor, limit: usize) -> DbResult<TabularResult> {
    let limit = limit.max(1);
    let columns = cursor.columns().to_vec();
    let width = columns.len();
    let mut rows = Vec::with_capacity(limit.min(1024));

    while rows.len() < limit {
        let Some(row) = cursor.next_row()? else {
            break;
        };
        if row.len() != width {
            return Err(DbError::internal(format!(
                "row has {} cells but result has {} columns",
                row.len(),
                width
            )));
        }
        rows.push(row);
    }

    let truncated = rows.len() == limit && cursor.skip_row()?;

    debug!(
        columns = width,
        rows = rows.len(),
        truncated,
        "Marshalled result"
    );

    Ok(TabularResult {
        columns,
        rows,
        truncated,
    })
}
