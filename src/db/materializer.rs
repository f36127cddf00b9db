//! Conversion of backend rows into [`ResultRow`]s.

use crate::db::types::RowDecoder;
use crate::error::{DbError, DbResult};
use crate::models::ResultRow;
use tracing::debug;

/// Decode every row of one result set, preserving column order and row order.
///
/// Column names are read from the first row. Materialization stops at the
/// first row reporting different column names, since that row belongs to
/// another result set. A row whose cell count disagrees with its names, or
/// any cell that fails to decode, aborts with [`DbError::Decode`]. Rows are
/// already fully fetched when this runs, so the connection has been
/// returned to the pool regardless of the outcome.
pub fn materialize<R: RowDecoder>(rows: &[R]) -> DbResult<Vec<ResultRow>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let columns = first.column_names();
    let mut out = Vec::with_capacity(rows.len());

    for (row_idx, row) in rows.iter().enumerate() {
        if row_idx > 0 && row.column_names() != columns {
            debug!(
                kept_rows = row_idx,
                dropped_rows = rows.len() - row_idx,
                "Result set boundary, ignoring remaining rows"
            );
            break;
        }

        if row.column_count() != columns.len() {
            return Err(DbError::decode(format!(
                "row {} has {} columns, expected {}",
                row_idx,
                row.column_count(),
                columns.len()
            )));
        }

        let mut result = ResultRow::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            result.push(name.clone(), row.decode_cell(idx)?);
        }
        out.push(result);
    }

    Ok(out)
}
