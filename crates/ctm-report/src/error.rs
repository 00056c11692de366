//! Error types for ctm-report.

use thiserror::Error;

use ctm_core::{LinkId, Timestamp};

use crate::row::Column;

/// A failure reported by a [`RowCursor`][crate::RowCursor] implementation.
///
/// Backends convert their native error into a message so the pivot engine
/// stays independent of any storage crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row cursor error: {message}")]
pub struct CursorError {
    pub message: String,
}

impl CursorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn type_mismatch(column: Column, expected: &str) -> Self {
        Self::new(format!("column {column} cannot be read as {expected}"))
    }
}

/// Errors that abort a decode.  None of them is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("non-contiguous ensemble index at {time}: expected at most {expected}, found {found}")]
    NonContiguousEnsembleIndex {
        time:     Timestamp,
        expected: i64,
        found:    i64,
    },

    #[error("fundamental diagram data on ensemble member {member} of {link} at {time}")]
    FdInEnsemble {
        time:   Timestamp,
        link:   LinkId,
        member: i64,
    },

    #[error("quantity type code {code} is not valid for ensemble rows ({link} at {time})")]
    UnexpectedQuantityType {
        time: Timestamp,
        link: LinkId,
        code: i64,
    },

    #[error("column {0} is required but absent from the result set")]
    MissingColumn(Column),

    #[error("column {0} is NULL on a row where it is required")]
    MissingValue(Column),

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Alias for `Result<T, DecodeError>`.
pub type DecodeResult<T> = Result<T, DecodeError>;
