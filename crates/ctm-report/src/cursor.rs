//! Row and cursor traits implemented by storage backends.
//!
//! A [`RowCursor`] is consumed strictly once, forward-only.  The decoder takes
//! it by `&mut`, so one cursor can never feed two decodes at the same time.

use crate::error::CursorError;
use crate::row::{Column, ReportRow};

/// One row of a result set with nullable typed fields.
pub trait Row {
    /// Read an integer column.  `Ok(None)` means SQL NULL.
    fn get_i64(&self, column: Column) -> Result<Option<i64>, CursorError>;

    /// Read a real column.  `Ok(None)` means SQL NULL.
    fn get_f64(&self, column: Column) -> Result<Option<f64>, CursorError>;
}

/// Ordered, forward-only sequence of rows.
pub trait RowCursor {
    /// Names of the columns available on every row of this cursor.
    fn column_names(&self) -> Vec<String>;

    /// Advance to the next row.  `Ok(None)` once the cursor is exhausted.
    ///
    /// The returned row borrows the cursor and is invalidated by the next
    /// call.
    fn next_row(&mut self) -> Result<Option<&dyn Row>, CursorError>;
}

// ── MemoryCursor ──────────────────────────────────────────────────────────────

/// A [`RowCursor`] over rows already held in memory, such as the output of
/// the encoder.
pub struct MemoryCursor {
    columns: Vec<String>,
    rows:    std::vec::IntoIter<ReportRow>,
    current: Option<ReportRow>,
}

impl MemoryCursor {
    /// Cursor exposing the debug-table columns if any row carries an ensemble
    /// index, the standard-table columns otherwise.
    pub fn new(rows: Vec<ReportRow>) -> Self {
        let columns: &[Column] = if rows.iter().any(|r| r.ensemble_index.is_some()) {
            &Column::DEBUG
        } else {
            &Column::STANDARD
        };
        Self::with_columns(columns.iter().map(|c| c.name().to_owned()).collect(), rows)
    }

    /// Cursor exposing an explicit column list.
    pub fn with_columns(columns: Vec<String>, rows: Vec<ReportRow>) -> Self {
        Self { columns, rows: rows.into_iter(), current: None }
    }
}

impl RowCursor for MemoryCursor {
    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn next_row(&mut self) -> Result<Option<&dyn Row>, CursorError> {
        self.current = self.rows.next();
        Ok(self.current.as_ref().map(|r| r as &dyn Row))
    }
}
