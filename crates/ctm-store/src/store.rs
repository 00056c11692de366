//! Report-level operations over any [`StorageSession`].
//!
//! Report rows are immutable once written: there is no update.  Replacing
//! reports means deleting a timestamp interval and inserting again, which
//! [`ReportStore::replace_reports`] does in one transaction.

use std::time::Instant;

use tracing::debug;

use ctm_core::{AggregationType, NetworkId, RunId, Timestamp};
use ctm_report::{
    decode_ensembles, decode_reports, encode_ensemble, encode_report, FreewayCtmEnsembleReport,
    FreewayCtmReport, LinkBuckets, ReportRow,
};

use crate::session::{ReportFilter, ReportTable, StorageSession};
use crate::{StoreError, StoreResult};

/// Reads and writes CTM reports through a borrowed [`StorageSession`].
///
/// The store is a cheap view: create one wherever a session is at hand.
pub struct ReportStore<'s, S: StorageSession> {
    session:     &'s S,
    aggregation: AggregationType,
}

fn elapsed_ms(t0: Instant) -> f64 {
    t0.elapsed().as_secs_f64() * 1_000.0
}

impl<'s, S: StorageSession> ReportStore<'s, S> {
    /// `aggregation` is stamped on every row this store writes.
    pub fn new(session: &'s S, aggregation: AggregationType) -> Self {
        Self { session, aggregation }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Single-estimate reports matching `filter`, one per timestamp,
    /// ascending.
    ///
    /// With `filter.debug` the debug table is read and only ensemble member 0
    /// is returned; rows of other members are skipped without error.
    pub fn read_reports(&self, filter: &ReportFilter) -> StoreResult<Vec<FreewayCtmReport>> {
        let t0 = Instant::now();
        let reports = self
            .session
            .query_rows(filter.table(), filter, |cursor| decode_reports(cursor))?;
        debug!(
            network = filter.network_id.0,
            run = filter.run_id.0,
            interval = %filter.interval,
            debug = filter.debug,
            reports = reports.len(),
            elapsed_ms = elapsed_ms(t0),
            "read CTM reports"
        );
        Ok(reports)
    }

    /// Ensemble reports matching `filter`.  Always reads the debug table;
    /// `filter.debug` is ignored.
    pub fn read_ensembles(&self, filter: &ReportFilter) -> StoreResult<Vec<FreewayCtmEnsembleReport>> {
        let t0 = Instant::now();
        let reports = self
            .session
            .query_rows(ReportTable::Debug, filter, |cursor| decode_ensembles(cursor))?;
        debug!(
            network = filter.network_id.0,
            run = filter.run_id.0,
            interval = %filter.interval,
            reports = reports.len(),
            elapsed_ms = elapsed_ms(t0),
            "read CTM ensemble reports"
        );
        Ok(reports)
    }

    /// The one report of `network_id`/`run_id` at exactly `time`.
    pub fn read_report_at(
        &self,
        network_id: NetworkId,
        run_id:     RunId,
        time:       Timestamp,
        debug:      bool,
    ) -> StoreResult<FreewayCtmReport> {
        let filter = ReportFilter::at(network_id, run_id, time).debug(debug);
        let mut reports: Vec<_> = self
            .read_reports(&filter)?
            .into_iter()
            .filter(|r| r.time == time)
            .collect();
        match reports.len() {
            0 => Err(StoreError::NotFound { network_id, run_id, time }),
            1 => Ok(reports.remove(0)),
            count => Err(StoreError::NotUnique { network_id, run_id, time, count }),
        }
    }

    /// Distinct report timestamps matching `filter`, ascending.
    pub fn list_timestamps(&self, filter: &ReportFilter) -> StoreResult<Vec<Timestamp>> {
        let t0 = Instant::now();
        let times = self.session.query_timestamps(filter.table(), filter)?;
        debug!(
            network = filter.network_id.0,
            run = filter.run_id.0,
            interval = %filter.interval,
            debug = filter.debug,
            timestamps = times.len(),
            elapsed_ms = elapsed_ms(t0),
            "listed CTM report timestamps"
        );
        Ok(times)
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Encode `report` for the standard table, or for the debug table as
    /// ensemble member 0.
    fn report_rows(&self, report: &FreewayCtmReport, debug: bool) -> Vec<ReportRow> {
        let mut rows = encode_report(report, self.aggregation);
        if debug {
            for row in &mut rows {
                row.ensemble_index = Some(0);
            }
        }
        rows
    }

    fn insert_reports(&self, reports: &[FreewayCtmReport], debug: bool) -> StoreResult<usize> {
        let table = ReportTable::for_debug(debug);
        let mut inserted = 0;
        for report in reports {
            inserted += self.session.insert_rows(table, &self.report_rows(report, debug))?;
        }
        Ok(inserted)
    }

    /// Insert one report.  Returns the number of rows written.
    pub fn write_report(&self, report: &FreewayCtmReport, debug: bool) -> StoreResult<usize> {
        self.write_reports(std::slice::from_ref(report), debug)
    }

    /// Insert `reports` in one transaction.  Returns the number of rows
    /// written.
    pub fn write_reports(&self, reports: &[FreewayCtmReport], debug: bool) -> StoreResult<usize> {
        let t0 = Instant::now();
        let table = ReportTable::for_debug(debug);
        let inserted = self.session.in_transaction(|_| self.insert_reports(reports, debug))?;
        debug!(
            reports = reports.len(),
            rows = inserted,
            table = %table,
            elapsed_ms = elapsed_ms(t0),
            "wrote CTM reports"
        );
        Ok(inserted)
    }

    /// Insert ensemble reports into the debug table in one transaction.
    ///
    /// A member without data writes no rows, so an empty member followed by
    /// a non-empty one could not be read back; such reports are rejected
    /// before anything is written.  Trailing empty members are dropped.
    pub fn write_ensembles(&self, reports: &[FreewayCtmEnsembleReport]) -> StoreResult<usize> {
        for report in reports {
            check_members(report)?;
        }

        let t0 = Instant::now();
        let inserted = self.session.in_transaction(|session| {
            let mut inserted = 0;
            for report in reports {
                inserted += session.insert_rows(ReportTable::Debug, &encode_ensemble(report, self.aggregation))?;
            }
            Ok(inserted)
        })?;
        debug!(
            reports = reports.len(),
            rows = inserted,
            elapsed_ms = elapsed_ms(t0),
            "wrote CTM ensemble reports"
        );
        Ok(inserted)
    }

    /// Delete every row matching `filter`.  Returns the number of rows
    /// deleted.
    pub fn delete_reports(&self, filter: &ReportFilter) -> StoreResult<usize> {
        let t0 = Instant::now();
        let deleted = self.session.delete_rows(filter.table(), filter)?;
        debug!(
            network = filter.network_id.0,
            run = filter.run_id.0,
            interval = %filter.interval,
            debug = filter.debug,
            rows = deleted,
            elapsed_ms = elapsed_ms(t0),
            "deleted CTM report rows"
        );
        Ok(deleted)
    }

    /// Delete the rows matching `filter`, then insert `reports`, atomically.
    ///
    /// Every report must belong to the filter's network and run and lie in
    /// its interval; otherwise nothing is changed.  Returns
    /// `(rows deleted, rows inserted)`.
    pub fn replace_reports(
        &self,
        filter:  &ReportFilter,
        reports: &[FreewayCtmReport],
    ) -> StoreResult<(usize, usize)> {
        if let Some(r) = reports.iter().find(|r| {
            r.network_id != filter.network_id
                || r.run_id != filter.run_id
                || !filter.interval.contains(r.time)
        }) {
            return Err(StoreError::OutsideFilter {
                network_id: r.network_id,
                run_id:     r.run_id,
                time:       r.time,
                interval:   filter.interval,
            });
        }

        let t0 = Instant::now();
        let (deleted, inserted) = self.session.in_transaction(|session| {
            let deleted = session.delete_rows(filter.table(), filter)?;
            let inserted = self.insert_reports(reports, filter.debug)?;
            Ok((deleted, inserted))
        })?;
        debug!(
            network = filter.network_id.0,
            run = filter.run_id.0,
            interval = %filter.interval,
            deleted,
            inserted,
            elapsed_ms = elapsed_ms(t0),
            "replaced CTM reports"
        );
        Ok((deleted, inserted))
    }
}

/// Fail on the first empty member that is followed by a non-empty one.
fn check_members(report: &FreewayCtmEnsembleReport) -> StoreResult<()> {
    let states = &report.ensemble_state.states;
    let Some(last_filled) = states.iter().rposition(|s| LinkBuckets::for_member(s).row_count() > 0) else {
        return Ok(());
    };
    match states[..last_filled].iter().position(|s| LinkBuckets::for_member(s).row_count() == 0) {
        Some(member) => Err(StoreError::EmptyEnsembleMember {
            network_id: report.network_id,
            run_id:     report.run_id,
            time:       report.time(),
            member,
        }),
        None => Ok(()),
    }
}
