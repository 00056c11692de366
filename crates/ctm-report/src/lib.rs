//! `ctm-report` — freeway CTM report model and the report pivot engine.
//!
//! Reports are stored as a flat, wide row stream: one row per link, per
//! quantity role, optionally per ensemble member, all rows of a report
//! sharing one timestamp.  Consumers work with nested per-timestamp report
//! objects.  This crate converts between the two.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`model`]     | `Fd`, link states, `FreewayCtmState`, report types            |
//! | [`row`]       | `Column`, `ReportRow` (the storage row contract)              |
//! | [`cursor`]    | `Row`, `RowCursor` traits, in-memory `MemoryCursor`           |
//! | [`schema`]    | `detect_debug_mode`                                           |
//! | [`classify`]  | `LinkBuckets`, `classify_links`                               |
//! | [`decode`]    | `decode_reports`, `decode_ensembles`                          |
//! | [`encode`]    | `encode_report`, `encode_ensemble`                            |
//! | [`error`]     | `DecodeError`, `CursorError`, `DecodeResult<T>`               |
//!
//! The engine performs no I/O: storage backends implement [`RowCursor`] for
//! reading and insert the [`ReportRow`]s produced by the encoder.
//!
//! # Usage
//!
//! ```
//! use ctm_core::{AggregationType, LinkId, NetworkId, RunId, Timestamp};
//! use ctm_report::{decode_reports, encode_report, FreewayCtmReport, FreewayCtmState, MemoryCursor};
//!
//! let mut report = FreewayCtmReport::new(NetworkId(1), RunId(7), Timestamp(60_000));
//! let mut mean = FreewayCtmState::default();
//! mean.set_queue_length(LinkId(101), 1.23);
//! report.mean = Some(mean);
//!
//! let rows = encode_report(&report, AggregationType::Raw);
//! let decoded = decode_reports(&mut MemoryCursor::new(rows)).unwrap();
//! assert_eq!(decoded, vec![report]);
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on model and row types.  |

pub mod classify;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod error;
pub mod model;
pub mod row;
pub mod schema;


pub use classify::{classify_links, LinkBuckets};
pub use cursor::{MemoryCursor, Row, RowCursor};
pub use decode::{decode_ensembles, decode_reports};
pub use encode::{encode_ensemble, encode_report};
pub use error::{CursorError, DecodeError, DecodeResult};
pub use model::{
    Fd, FreewayCtmEnsembleReport, FreewayCtmEnsembleState, FreewayCtmReport, FreewayCtmState,
    FreewayLinkFlowState, FreewayLinkState,
};
pub use row::{Column, ReportRow};
pub use schema::detect_debug_mode;
