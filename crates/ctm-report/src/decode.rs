//! Rows → reports.
//!
//! # Grouping
//!
//! The cursor must deliver rows sorted by timestamp (and by ensemble index
//! within a timestamp for ensembles).  The decoder keeps one open group; a
//! row whose timestamp differs from the open group's closes it and opens a
//! new one.  Network and run ids of a group come from its first row.  Rows
//! are never re-sorted, so an unsorted cursor yields one report per run of
//! equal timestamps.
//!
//! # Merging
//!
//! Several rows may describe the same link.  Non-null fields overwrite, null
//! fields never erase: two rows carrying free-flow speed and capacity for the
//! same link decode to one FD entry with both set.
//!
//! # Debug table, single estimate
//!
//! When [`decode_reports`] reads the debug table, member 0 is the single
//! estimate and rows of members above 0 are skipped without error.  This
//! filtering is silent by contract; the number of skipped rows is only
//! logged.

use tracing::{debug, trace};

use ctm_core::{LinkId, NetworkId, QuantityType, RunId, Timestamp};

use crate::cursor::{Row, RowCursor};
use crate::error::{DecodeError, DecodeResult};
use crate::model::{
    Fd, FreewayCtmEnsembleReport, FreewayCtmReport, FreewayCtmState, FreewayLinkFlowState,
    FreewayLinkState,
};
use crate::row::Column;
use crate::schema::detect_debug_mode;

// ── Row reading ───────────────────────────────────────────────────────────────

/// Identifying columns of one row.
struct RowKey {
    network_id:    NetworkId,
    run_id:        RunId,
    time:          Timestamp,
    link_id:       LinkId,
    quantity_code: i64,
}

/// Nullable data columns of one row.
struct RowValues {
    fd:           Fd,
    flow:         FreewayLinkFlowState,
    state:        FreewayLinkState,
    queue_length: Option<f64>,
}

impl RowValues {
    fn has_quantities(&self) -> bool {
        !self.flow.is_empty() || !self.state.is_empty() || self.queue_length.is_some()
    }
}

fn required(row: &dyn Row, column: Column) -> DecodeResult<i64> {
    row.get_i64(column)?.ok_or(DecodeError::MissingValue(column))
}

fn read_key(row: &dyn Row) -> DecodeResult<RowKey> {
    Ok(RowKey {
        network_id:    NetworkId(required(row, Column::NetworkId)?),
        run_id:        RunId(required(row, Column::RunId)?),
        time:          Timestamp(required(row, Column::Timestamp)?),
        link_id:       LinkId(required(row, Column::LinkId)?),
        quantity_code: required(row, Column::QuantityType)?,
    })
}

fn read_values(row: &dyn Row) -> DecodeResult<RowValues> {
    Ok(RowValues {
        fd: Fd {
            free_flow_speed:       row.get_f64(Column::FreeFlowSpeed)?,
            critical_speed:        row.get_f64(Column::CriticalSpeed)?,
            congestion_wave_speed: row.get_f64(Column::CongestionWaveSpeed)?,
            capacity:              row.get_f64(Column::Capacity)?,
            jam_density:           row.get_f64(Column::JamDensity)?,
            capacity_drop:         row.get_f64(Column::CapacityDrop)?,
        },
        flow: FreewayLinkFlowState {
            in_flow:  row.get_f64(Column::InFlow)?,
            out_flow: row.get_f64(Column::OutFlow)?,
        },
        state: FreewayLinkState {
            density: row.get_f64(Column::Density)?,
            speed:   row.get_f64(Column::Speed)?,
        },
        queue_length: row.get_f64(Column::QueueLength)?,
    })
}

/// Merge the quantity columns of one row into `state`.
fn apply_quantities(state: &mut FreewayCtmState, link: LinkId, values: &RowValues) {
    if !values.flow.is_empty() {
        state.merge_link_flow_state(link, values.flow);
    }
    if !values.state.is_empty() {
        state.merge_link_state(link, values.state);
    }
    if let Some(queue) = values.queue_length {
        state.set_queue_length(link, queue);
    }
}

// ── Single-estimate decode ────────────────────────────────────────────────────

/// Decode single-estimate reports, one per timestamp group.
///
/// Works on both tables: the schema mode is detected from the cursor's
/// columns, and in debug mode only ensemble member 0 is read.  Rows with an
/// unrecognised quantity-type code still contribute FD data but no state.
pub fn decode_reports<C: RowCursor + ?Sized>(cursor: &mut C) -> DecodeResult<Vec<FreewayCtmReport>> {
    let debug_mode = detect_debug_mode(&cursor.column_names());

    let mut reports: Vec<FreewayCtmReport> = Vec::new();
    let mut current: Option<FreewayCtmReport> = None;
    let mut row_count = 0usize;
    let mut skipped = 0usize;

    while let Some(row) = cursor.next_row()? {
        row_count += 1;
        if debug_mode && required(row, Column::EnsembleIndex)? > 0 {
            skipped += 1;
            continue;
        }
        let key = read_key(row)?;
        let values = read_values(row)?;

        if current.as_ref().is_some_and(|r| r.time != key.time) {
            reports.extend(current.take());
        }
        let report = current
            .get_or_insert_with(|| FreewayCtmReport::new(key.network_id, key.run_id, key.time));

        if !values.fd.is_empty() {
            report.merge_fd(key.link_id, &values.fd);
        }

        let target = match QuantityType::from_code(key.quantity_code) {
            Some(QuantityType::Mean)   => &mut report.mean,
            Some(QuantityType::StdDev) => &mut report.std_dev,
            None => continue,
        };
        if values.has_quantities() {
            apply_quantities(target.get_or_insert_with(FreewayCtmState::default), key.link_id, &values);
        }
    }
    reports.extend(current);

    debug!(debug_mode, rows = row_count, skipped, reports = reports.len(), "decoded CTM reports");
    Ok(reports)
}

// ── Ensemble decode ───────────────────────────────────────────────────────────

/// The open timestamp group of an ensemble decode.
struct EnsembleGroup {
    report:     FreewayCtmEnsembleReport,
    prev_index: i64,
}

impl EnsembleGroup {
    fn open(key: &RowKey) -> Self {
        Self {
            report:     FreewayCtmEnsembleReport::new(key.network_id, key.run_id, key.time),
            prev_index: -1,
        }
    }

    /// The member state a row with ensemble index `index` accumulates into.
    ///
    /// `index` must repeat the previous index or advance it by exactly one.
    fn member(&mut self, index: i64) -> DecodeResult<&mut FreewayCtmState> {
        let time = self.report.time();
        let states = &mut self.report.ensemble_state.states;

        if index == self.prev_index + 1 {
            trace!(%time, member = index, "opening ensemble member");
            states.push(FreewayCtmState::default());
            self.prev_index = index;
        } else if index != self.prev_index {
            return Err(DecodeError::NonContiguousEnsembleIndex {
                time,
                expected: self.prev_index + 1,
                found:    index,
            });
        }

        states.last_mut().ok_or(DecodeError::NonContiguousEnsembleIndex {
            time,
            expected: 0,
            found:    index,
        })
    }
}

/// Decode ensemble reports from the debug table, one per timestamp group.
///
/// Fails when the cursor has rows but no ensemble-index column, when member
/// indices skip or go backwards, when a row carries FD data, or when a row's
/// quantity type is not mean.
pub fn decode_ensembles<C: RowCursor + ?Sized>(
    cursor: &mut C,
) -> DecodeResult<Vec<FreewayCtmEnsembleReport>> {
    let debug_mode = detect_debug_mode(&cursor.column_names());

    let mut reports: Vec<FreewayCtmEnsembleReport> = Vec::new();
    let mut current: Option<EnsembleGroup> = None;
    let mut row_count = 0usize;

    while let Some(row) = cursor.next_row()? {
        if !debug_mode {
            return Err(DecodeError::MissingColumn(Column::EnsembleIndex));
        }
        row_count += 1;
        let key = read_key(row)?;
        let index = required(row, Column::EnsembleIndex)?;
        let values = read_values(row)?;

        if !values.fd.is_empty() {
            return Err(DecodeError::FdInEnsemble { time: key.time, link: key.link_id, member: index });
        }
        if QuantityType::from_code(key.quantity_code) != Some(QuantityType::Mean) {
            return Err(DecodeError::UnexpectedQuantityType {
                time: key.time,
                link: key.link_id,
                code: key.quantity_code,
            });
        }

        if current.as_ref().is_some_and(|g| g.report.time() != key.time) {
            reports.extend(current.take().map(|g| g.report));
        }
        let group = current.get_or_insert_with(|| EnsembleGroup::open(&key));
        apply_quantities(group.member(index)?, key.link_id, &values);
    }
    reports.extend(current.map(|g| g.report));

    debug!(rows = row_count, reports = reports.len(), "decoded CTM ensemble reports");
    Ok(reports)
}
