//! `ctm-core` — foundational types for freeway CTM report persistence.
//!
//! This crate is a dependency of every other `ctm-*` crate.  It has no
//! `ctm-*` dependencies and only `thiserror` (plus optional `serde`)
//! externally.
//!
//! # What lives here
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`ids`]    | `NetworkId`, `RunId`, `LinkId`                             |
//! | [`time`]   | `Timestamp` (epoch millis), `TimeInterval`                 |
//! | [`codes`]  | `QuantityType`, `AggregationType` storage discriminators   |
//! | [`error`]  | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod codes;
pub mod error;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use codes::{AggregationType, QuantityType};
pub use error::{CoreError, CoreResult};
pub use ids::{LinkId, NetworkId, RunId};
pub use time::{TimeInterval, Timestamp};
