//! Schema-mode detection.
//!
//! Whether rows come from the debug/ensemble table or the standard table is
//! decided from the result set's columns alone: the debug table is the only
//! one carrying the ensemble-member index (`ctm_id`).  Nothing else in the
//! engine looks at column names.

use crate::row::Column;

/// `true` iff `columns` contains the ensemble-member index column.
/// Names are compared case-insensitively.
pub fn detect_debug_mode<S: AsRef<str>>(columns: &[S]) -> bool {
    let index = Column::EnsembleIndex.name();
    columns.iter().any(|c| c.as_ref().eq_ignore_ascii_case(index))
}
