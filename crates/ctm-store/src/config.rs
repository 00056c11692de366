//! Store configuration.
//!
//! Loaded by the application from a JSON file:
//!
//! ```json
//! {
//!   "db_path": "output/ctm.db",
//!   "aggregation": "raw",
//!   "wal": true,
//!   "busy_timeout_ms": 5000
//! }
//! ```
//!
//! Only `db_path` is required.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ctm_core::AggregationType;

use crate::{StoreError, StoreResult};

/// Settings for opening a [`SqliteSession`][crate::SqliteSession] and
/// writing reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file.  Created if missing.
    pub db_path: PathBuf,

    /// Aggregation type stamped on every written row.
    #[serde(default)]
    pub aggregation: AggregationType,

    /// Use the WAL journal with `synchronous = NORMAL`.
    #[serde(default = "default_wal")]
    pub wal: bool,

    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_wal() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl StoreConfig {
    /// Defaults for everything except the database path.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path:         db_path.into(),
            aggregation:     AggregationType::default(),
            wal:             default_wal(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_path(path: &Path) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings no session could be opened with.
    pub fn validate(&self) -> StoreResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(StoreError::Config("db_path is empty".into()));
        }
        if self.busy_timeout_ms == 0 {
            return Err(StoreError::Config("busy_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}
