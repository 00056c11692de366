//! Error types for ctm-store.

use thiserror::Error;

use ctm_core::{NetworkId, RunId, TimeInterval, Timestamp};
use ctm_report::DecodeError;

/// Errors that can occur when reading or writing stored reports.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("report decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("no report for {network_id}, {run_id} at {time}")]
    NotFound {
        network_id: NetworkId,
        run_id:     RunId,
        time:       Timestamp,
    },

    #[error("{count} reports for {network_id}, {run_id} at {time}; expected exactly one")]
    NotUnique {
        network_id: NetworkId,
        run_id:     RunId,
        time:       Timestamp,
        count:      usize,
    },

    #[error("report for {network_id}, {run_id} at {time} lies outside filter {interval}")]
    OutsideFilter {
        network_id: NetworkId,
        run_id:     RunId,
        time:       Timestamp,
        interval:   TimeInterval,
    },

    #[error("ensemble report for {network_id}, {run_id} at {time}: member {member} is empty but later members are not")]
    EmptyEnsembleMember {
        network_id: NetworkId,
        run_id:     RunId,
        time:       Timestamp,
        member:     usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;
