//! The storage-session capability the report store is written against.
//!
//! A session is passed by reference into every store operation; nothing
//! holds a connection handle of its own.  One session serves one caller at a
//! time: cursors it hands out are consumed before the next call.

use std::fmt;

use ctm_core::{NetworkId, RunId, TimeInterval, Timestamp};
use ctm_report::{Column, DecodeResult, ReportRow, RowCursor};

use crate::StoreResult;

// ── ReportTable ───────────────────────────────────────────────────────────────

/// The two physical report tables.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ReportTable {
    /// Single-estimate rows, no ensemble index.
    Standard,
    /// Ensemble rows keyed additionally by member index (`ctm_id`).
    Debug,
}

impl ReportTable {
    pub fn for_debug(debug: bool) -> Self {
        if debug { ReportTable::Debug } else { ReportTable::Standard }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ReportTable::Standard => "link_data_total",
            ReportTable::Debug    => "link_data_total_debug",
        }
    }

    /// Columns of the table, in storage order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            ReportTable::Standard => &Column::STANDARD,
            ReportTable::Debug    => &Column::DEBUG,
        }
    }
}

impl fmt::Display for ReportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── ReportFilter ──────────────────────────────────────────────────────────────

/// Selects the rows of one network and run inside a closed time interval.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ReportFilter {
    pub network_id: NetworkId,
    pub run_id:     RunId,
    pub interval:   TimeInterval,
    /// Read from (or delete in) the debug table instead of the standard one.
    pub debug:      bool,
}

impl ReportFilter {
    /// Filter on the standard table.
    pub fn new(network_id: NetworkId, run_id: RunId, interval: TimeInterval) -> Self {
        Self { network_id, run_id, interval, debug: false }
    }

    /// Filter selecting exactly one timestamp.
    pub fn at(network_id: NetworkId, run_id: RunId, time: Timestamp) -> Self {
        Self::new(network_id, run_id, TimeInterval::at(time))
    }

    /// Same filter on the debug table.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn table(&self) -> ReportTable {
        ReportTable::for_debug(self.debug)
    }
}

// ── StorageSession ────────────────────────────────────────────────────────────

/// Storage backend operations needed by [`ReportStore`][crate::ReportStore].
///
/// Reads hand a forward-only cursor to a callback instead of returning it, so
/// a backend may keep its statement and cursor on the stack.
pub trait StorageSession {
    /// Run `consume` over the rows of `table` matching `filter` (the table
    /// is passed explicitly so ensemble reads can force the debug table).
    ///
    /// Rows must arrive sorted by timestamp, then ensemble index (debug
    /// table), then link id.
    fn query_rows<T>(
        &self,
        table:   ReportTable,
        filter:  &ReportFilter,
        consume: impl FnOnce(&mut dyn RowCursor) -> DecodeResult<T>,
    ) -> StoreResult<T>;

    /// Distinct timestamps of `table` matching `filter`, ascending.
    fn query_timestamps(&self, table: ReportTable, filter: &ReportFilter) -> StoreResult<Vec<Timestamp>>;

    /// Insert `rows` into `table`.  Returns the number of rows inserted.
    fn insert_rows(&self, table: ReportTable, rows: &[ReportRow]) -> StoreResult<usize>;

    /// Delete the rows of `table` matching `filter`.  Returns the number of
    /// rows deleted.
    fn delete_rows(&self, table: ReportTable, filter: &ReportFilter) -> StoreResult<usize>;

    /// Run `body` inside one transaction: commit on `Ok`, roll back on `Err`.
    /// Must not be nested.
    fn in_transaction<T>(&self, body: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T>;
}
