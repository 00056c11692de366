//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where they need to.

use thiserror::Error;

use crate::Timestamp;

/// Errors produced while interpreting raw storage values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown quantity type code {0}")]
    UnknownQuantityType(i64),

    #[error("unknown aggregation type code {0}")]
    UnknownAggregationType(i64),

    #[error("invalid time interval: start {start} is after end {end}")]
    InvalidInterval { start: Timestamp, end: Timestamp },
}

/// Shorthand result type for `ctm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
