//! `ctm-store` — persistence of freeway CTM reports.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`session`]  | `StorageSession` trait, `ReportTable`, `ReportFilter`       |
//! | [`sqlite`]   | `SqliteSession`, `SqliteCursor`                             |
//! | [`schema`]   | DDL and statement text for both report tables               |
//! | [`store`]    | `ReportStore`: read, write, delete, replace reports         |
//! | [`config`]   | `StoreConfig` (JSON)                                        |
//! | [`parallel`] | `read_reports_parallel` (feature = `"parallel"` only)       |
//! | [`error`]    | `StoreError`, `StoreResult<T>`                              |
//!
//! # Usage
//!
//! ```rust,ignore
//! use ctm_store::{ReportFilter, ReportStore, SqliteSession, StoreConfig};
//!
//! let config = StoreConfig::from_json_path(Path::new("store.json"))?;
//! let session = SqliteSession::open(&config)?;
//! let store = ReportStore::new(&session, config.aggregation);
//! let reports = store.read_reports(&ReportFilter::new(network, run, interval))?;
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Enables `read_reports_parallel` via Rayon.                |

pub mod config;
pub mod error;
pub mod schema;
pub mod session;
pub mod sqlite;
pub mod store;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(test)]
mod tests;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use session::{ReportFilter, ReportTable, StorageSession};
pub use sqlite::{SqliteCursor, SqliteSession};
pub use store::ReportStore;

#[cfg(feature = "parallel")]
pub use parallel::read_reports_parallel;
