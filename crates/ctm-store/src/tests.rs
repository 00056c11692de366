//! Integration tests for ctm-store.
//!
//! Most tests run against an in-memory SQLite database; file-backed tests use
//! a temporary directory.

#[cfg(test)]
mod helpers {
    use std::collections::BTreeMap;

    use ctm_core::{AggregationType, LinkId, NetworkId, RunId, TimeInterval, Timestamp};
    use ctm_report::{
        Fd, FreewayCtmEnsembleReport, FreewayCtmReport, FreewayCtmState, FreewayLinkFlowState,
        FreewayLinkState,
    };

    use crate::{ReportFilter, ReportStore, SqliteSession};

    pub const NET: NetworkId = NetworkId(1);
    pub const RUN: RunId = RunId(42);

    pub fn session() -> SqliteSession {
        SqliteSession::open_in_memory().expect("open in-memory db")
    }

    pub fn store(session: &SqliteSession) -> ReportStore<'_, SqliteSession> {
        ReportStore::new(session, AggregationType::Raw)
    }

    pub fn filter(start: i64, end: i64) -> ReportFilter {
        ReportFilter::new(NET, RUN, TimeInterval::new(Timestamp(start), Timestamp(end)).unwrap())
    }

    pub fn count(session: &SqliteSession, table: &str) -> i64 {
        session
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    /// Queue on 101, density/speed on 102, free-flow speed on 102.
    pub fn scenario_report(ts: i64) -> FreewayCtmReport {
        let mut report = FreewayCtmReport::new(NET, RUN, Timestamp(ts));
        let mut mean = FreewayCtmState::default();
        mean.set_queue_length(LinkId(101), 1.23);
        mean.merge_link_state(LinkId(102), FreewayLinkState::new(100.1, 10.1));
        report.mean = Some(mean);
        report.fd = Some(BTreeMap::from([(
            LinkId(102),
            Fd { free_flow_speed: Some(12.34), ..Fd::default() },
        )]));
        report
    }

    /// A report with both roles and flows.
    pub fn full_report(ts: i64) -> FreewayCtmReport {
        let mut report = scenario_report(ts);
        if let Some(mean) = report.mean.as_mut() {
            mean.merge_link_flow_state(LinkId(103), FreewayLinkFlowState::new(1500.0, 1480.0));
        }
        let mut std_dev = FreewayCtmState::default();
        std_dev.merge_link_state(LinkId(102), FreewayLinkState::new(3.5, 1.2));
        std_dev.set_queue_length(LinkId(101), 0.05);
        report.std_dev = Some(std_dev);
        report
    }

    pub fn ensemble(ts: i64, members: usize) -> FreewayCtmEnsembleReport {
        let mut report = FreewayCtmEnsembleReport::new(NET, RUN, Timestamp(ts));
        for k in 0..members {
            let mut s = FreewayCtmState::default();
            s.merge_link_state(LinkId(102), FreewayLinkState::new(100.0 + k as f64, 10.0));
            s.set_queue_length(LinkId(101), k as f64);
            report.ensemble_state.states.push(s);
        }
        report
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod schema {
    use crate::schema::{create_table_sql, insert_sql, select_sql};
    use crate::ReportTable;
    use super::helpers::{count, session};

    #[test]
    fn ddl_marks_keys_not_null() {
        let sql = create_table_sql(ReportTable::Standard);
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS link_data_total ("));
        assert!(sql.contains("network_id    INTEGER NOT NULL"));
        assert!(sql.contains("queue_len     REAL"));
        assert!(!sql.contains("ctm_id"));
        assert!(create_table_sql(ReportTable::Debug).contains("ctm_id        INTEGER NOT NULL"));
    }

    #[test]
    fn insert_binds_every_column() {
        let sql = insert_sql(ReportTable::Debug);
        assert!(sql.ends_with("?18)"), "{sql}");
    }

    #[test]
    fn debug_select_orders_by_member() {
        assert!(select_sql(ReportTable::Debug).ends_with("ORDER BY ts, ctm_id, link_id, qty_type"));
        assert!(select_sql(ReportTable::Standard).ends_with("ORDER BY ts, link_id, qty_type"));
    }

    #[test]
    fn tables_created_empty() {
        let s = session();
        assert_eq!(count(&s, "link_data_total"), 0);
        assert_eq!(count(&s, "link_data_total_debug"), 0);
    }
}

// ── Single-estimate reports ───────────────────────────────────────────────────

#[cfg(test)]
mod reports {
    use ctm_core::{LinkId, NetworkId, Timestamp};

    use crate::StoreError;
    use super::helpers::{count, filter, full_report, scenario_report, session, store, NET, RUN};

    #[test]
    fn scenario_writes_two_rows_and_reads_back() {
        let s = session();
        let st = store(&s);
        let report = scenario_report(1_000);

        assert_eq!(st.write_report(&report, false).unwrap(), 2);
        assert_eq!(count(&s, "link_data_total"), 2);

        let (queue, density, ff): (Option<f64>, Option<f64>, Option<f64>) = s
            .connection()
            .query_row(
                "SELECT queue_len, density, ff_speed FROM link_data_total WHERE link_id = 101",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((queue, density, ff), (Some(1.23), None, None));

        let (qty, agg): (i64, i64) = s
            .connection()
            .query_row("SELECT qty_type, agg_type FROM link_data_total WHERE link_id = 102", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!((qty, agg), (2, 1));

        assert_eq!(st.read_reports(&filter(0, 10_000)).unwrap(), vec![report]);
    }

    #[test]
    fn full_report_round_trips() {
        let s = session();
        let st = store(&s);
        let report = full_report(5);
        st.write_report(&report, false).unwrap();
        assert_eq!(st.read_reports(&filter(5, 5)).unwrap(), vec![report]);
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let s = session();
        let st = store(&s);
        let reports: Vec<_> = [100, 200, 300, 400].into_iter().map(scenario_report).collect();
        st.write_reports(&reports, false).unwrap();

        let got = st.read_reports(&filter(200, 300)).unwrap();
        let times: Vec<_> = got.iter().map(|r| r.time).collect();
        assert_eq!(times, [Timestamp(200), Timestamp(300)]);
        assert_eq!(got, reports[1..3]);
    }

    #[test]
    fn other_networks_are_not_read() {
        let s = session();
        let st = store(&s);
        let mut other = scenario_report(100);
        other.network_id = NetworkId(2);
        st.write_reports(&[scenario_report(100), other], false).unwrap();

        let got = st.read_reports(&filter(0, 1_000)).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].network_id, NET);
    }

    #[test]
    fn read_report_at_finds_one() {
        let s = session();
        let st = store(&s);
        st.write_reports(&[scenario_report(10), scenario_report(20)], false).unwrap();
        let r = st.read_report_at(NET, RUN, Timestamp(20), false).unwrap();
        assert_eq!(r, scenario_report(20));
    }

    #[test]
    fn read_report_at_missing() {
        let s = session();
        let err = store(&s).read_report_at(NET, RUN, Timestamp(20), false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { time: Timestamp(20), .. }));
    }

    #[test]
    fn list_timestamps_is_distinct_and_sorted() {
        let s = session();
        let st = store(&s);
        st.write_reports(&[full_report(300), full_report(100), full_report(200)], false).unwrap();
        assert_eq!(
            st.list_timestamps(&filter(0, 250)).unwrap(),
            [Timestamp(100), Timestamp(200)]
        );
    }

    #[test]
    fn null_data_columns_stay_null() {
        let s = session();
        let st = store(&s);
        st.write_report(&full_report(0), false).unwrap();
        let fd_rows: i64 = s
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM link_data_total WHERE qty_type = 4 AND ff_speed IS NOT NULL",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(fd_rows, 0, "std-dev rows carry no FD");
        let r = st.read_reports(&filter(0, 0)).unwrap();
        assert!(r[0].fd.as_ref().unwrap().get(&LinkId(103)).is_none());
    }
}

// ── Debug table and ensembles ─────────────────────────────────────────────────

#[cfg(test)]
mod ensembles {
    use ctm_core::{AggregationType, LinkId, QuantityType, Timestamp};
    use ctm_report::{DecodeError, FreewayCtmState, ReportRow};

    use crate::{ReportTable, StorageSession, StoreError};
    use super::helpers::{count, ensemble, filter, scenario_report, session, store, NET, RUN};

    #[test]
    fn ensembles_round_trip() {
        let s = session();
        let st = store(&s);
        let reports = vec![ensemble(0, 3), ensemble(60_000, 2)];
        assert_eq!(st.write_ensembles(&reports).unwrap(), 10);
        assert_eq!(count(&s, "link_data_total_debug"), 10);
        assert_eq!(st.read_ensembles(&filter(0, 60_000)).unwrap(), reports);
    }

    #[test]
    fn single_read_of_debug_table_keeps_member_zero() {
        let s = session();
        let st = store(&s);
        let ens = ensemble(500, 4);
        st.write_ensembles(&[ens.clone()]).unwrap();

        let reports = st.read_reports(&filter(0, 1_000).debug(true)).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].mean.as_ref(), Some(&ens.ensemble_state.states[0]));
        assert!(reports[0].std_dev.is_none());
    }

    #[test]
    fn single_report_in_debug_table_is_member_zero() {
        let s = session();
        let st = store(&s);
        let mut report = scenario_report(7);
        report.fd = None;
        st.write_report(&report, true).unwrap();

        let members: Vec<i64> = s
            .connection()
            .prepare("SELECT DISTINCT ctm_id FROM link_data_total_debug")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(members, [0]);

        assert_eq!(st.read_report_at(NET, RUN, Timestamp(7), true).unwrap(), report);
        let ens = st.read_ensembles(&filter(7, 7)).unwrap();
        assert_eq!(ens[0].ensemble_state.states, vec![report.mean.unwrap()]);
    }

    fn member_row(ts: i64, link: i64, member: i64) -> ReportRow {
        let mut r = ReportRow::new(NET, RUN, Timestamp(ts), LinkId(link), AggregationType::Raw, QuantityType::Mean);
        r.ensemble_index = Some(member);
        r.state.density = Some(1.0);
        r
    }

    #[test]
    fn member_gap_in_storage_fails_decode() {
        let s = session();
        s.insert_rows(ReportTable::Debug, &[member_row(0, 1, 0), member_row(0, 1, 2)]).unwrap();
        let err = store(&s).read_ensembles(&filter(0, 0)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Decode(DecodeError::NonContiguousEnsembleIndex { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn fd_in_ensemble_storage_fails_decode() {
        let s = session();
        let mut r = member_row(0, 1, 0);
        r.fd.capacity = Some(2000.0);
        s.insert_rows(ReportTable::Debug, &[r]).unwrap();
        let err = store(&s).read_ensembles(&filter(0, 0)).unwrap_err();
        assert!(matches!(err, StoreError::Decode(DecodeError::FdInEnsemble { .. })));
    }

    #[test]
    fn empty_inner_member_is_rejected_before_writing() {
        let s = session();
        let st = store(&s);
        let mut gap = ensemble(100, 3);
        gap.ensemble_state.states[1] = FreewayCtmState::default();

        let err = st.write_ensembles(&[ensemble(0, 2), gap]).unwrap_err();
        assert!(matches!(err, StoreError::EmptyEnsembleMember { member: 1, time: Timestamp(100), .. }));
        assert_eq!(count(&s, "link_data_total_debug"), 0, "nothing written");
    }

    #[test]
    fn trailing_empty_member_is_dropped() {
        let s = session();
        let st = store(&s);
        let mut tail = ensemble(100, 2);
        tail.ensemble_state.states.push(FreewayCtmState::default());

        assert_eq!(st.write_ensembles(&[tail]).unwrap(), 4);
        let read = st.read_ensembles(&filter(100, 100)).unwrap();
        assert_eq!(read[0].ensemble_state, ensemble(100, 2).ensemble_state);
    }

    #[test]
    fn rows_sort_by_member_before_link() {
        let s = session();
        // Inserted out of order; the select must restore (ts, ctm_id, link_id).
        s.insert_rows(
            ReportTable::Debug,
            &[member_row(0, 2, 1), member_row(0, 1, 0), member_row(0, 1, 1), member_row(0, 2, 0)],
        )
        .unwrap();
        let ens = store(&s).read_ensembles(&filter(0, 0)).unwrap();
        assert_eq!(ens[0].ensemble_state.member_count(), 2);
        for member in &ens[0].ensemble_state.states {
            assert_eq!(member.link_state_map.as_ref().unwrap().len(), 2);
        }
    }
}

// ── Delete, replace, transactions ─────────────────────────────────────────────

#[cfg(test)]
mod mutation {
    use ctm_core::{AggregationType, LinkId, QuantityType, RunId, Timestamp};
    use ctm_report::ReportRow;

    use crate::{ReportTable, StorageSession, StoreError};
    use super::helpers::{count, ensemble, filter, full_report, scenario_report, session, store, NET, RUN};

    #[test]
    fn ranged_delete_returns_row_count() {
        let s = session();
        let st = store(&s);
        st.write_reports(&[scenario_report(100), scenario_report(200), scenario_report(300)], false)
            .unwrap();

        assert_eq!(st.delete_reports(&filter(150, 300)).unwrap(), 4);
        assert_eq!(count(&s, "link_data_total"), 2);
        assert_eq!(st.read_reports(&filter(0, 1_000)).unwrap(), vec![scenario_report(100)]);
    }

    #[test]
    fn delete_targets_one_table() {
        let s = session();
        let st = store(&s);
        st.write_report(&scenario_report(0), false).unwrap();
        st.write_ensembles(&[ensemble(0, 2)]).unwrap();

        assert_eq!(st.delete_reports(&filter(0, 0).debug(true)).unwrap(), 4);
        assert_eq!(count(&s, "link_data_total_debug"), 0);
        assert_eq!(count(&s, "link_data_total"), 2);
    }

    #[test]
    fn replace_swaps_interval_contents() {
        let s = session();
        let st = store(&s);
        st.write_reports(&[scenario_report(100), scenario_report(200)], false).unwrap();

        let (deleted, inserted) = st.replace_reports(&filter(100, 200), &[full_report(150)]).unwrap();
        assert_eq!(deleted, 4);
        assert_eq!(inserted, 5);
        assert_eq!(st.read_reports(&filter(0, 1_000)).unwrap(), vec![full_report(150)]);
    }

    #[test]
    fn replace_rejects_reports_outside_filter() {
        let s = session();
        let st = store(&s);
        st.write_report(&scenario_report(100), false).unwrap();

        let err = st.replace_reports(&filter(100, 200), &[scenario_report(250)]).unwrap_err();
        assert!(matches!(err, StoreError::OutsideFilter { time: Timestamp(250), .. }));

        let mut other_run = scenario_report(150);
        other_run.run_id = RunId(7);
        assert!(st.replace_reports(&filter(100, 200), &[other_run]).is_err());

        assert_eq!(count(&s, "link_data_total"), 2, "nothing deleted");
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let s = session();
        let good = {
            let mut r = ReportRow::new(NET, RUN, Timestamp(0), LinkId(1), AggregationType::Raw, QuantityType::Mean);
            r.ensemble_index = Some(0);
            r
        };
        // No ensemble index: violates NOT NULL on ctm_id.
        let bad = ReportRow::new(NET, RUN, Timestamp(0), LinkId(2), AggregationType::Raw, QuantityType::Mean);

        let result = s.in_transaction(|tx| {
            tx.insert_rows(ReportTable::Debug, &[good])?;
            tx.insert_rows(ReportTable::Debug, &[bad])?;
            Ok(())
        });
        assert!(matches!(result, Err(StoreError::Sqlite(_))));
        assert_eq!(count(&s, "link_data_total_debug"), 0);
    }
}

// ── Cursor behaviour ──────────────────────────────────────────────────────────

#[cfg(test)]
mod cursor {
    use ctm_core::{AggregationType, NetworkId, RunId, TimeInterval, Timestamp};
    use ctm_report::{decode_reports, encode_report, Column, DecodeResult, MemoryCursor, ReportRow, RowCursor};

    use crate::{ReportFilter, ReportStore, ReportTable, SqliteCursor, StorageSession, StoreError, StoreResult};
    use super::helpers::{scenario_report, session, store, NET, RUN};

    #[test]
    fn upper_case_columns_still_decode() {
        let s = session();
        store(&s).write_report(&scenario_report(9), false).unwrap();

        let select = Column::STANDARD
            .iter()
            .map(|c| format!("{} AS {}", c.name(), c.name().to_uppercase()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = s
            .connection()
            .prepare(&format!("SELECT {select} FROM link_data_total ORDER BY ts, link_id"))
            .unwrap();
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_owned).collect();
        assert_eq!(columns[0], "NETWORK_ID");
        let rows = stmt.query([]).unwrap();
        let mut cursor = SqliteCursor::new(columns, rows);

        assert_eq!(decode_reports(&mut cursor).unwrap(), vec![scenario_report(9)]);
    }

    #[test]
    fn early_close_truncates() {
        let s = session();
        let st = store(&s);
        st.write_reports(&[scenario_report(1), scenario_report(2)], false).unwrap();

        let filter = ReportFilter::new(NET, RUN, TimeInterval::all());
        let first = s
            .query_rows(ReportTable::Standard, &filter, |cursor| {
                let row = cursor.next_row()?;
                Ok(row.is_some())
            })
            .unwrap();
        assert!(first);
        assert_eq!(st.read_reports(&filter).unwrap().len(), 2, "session still usable");
    }

    /// A session that ignores filters and replays fixed rows, in the order
    /// given.
    struct ReplaySession {
        rows: Vec<ReportRow>,
    }

    impl StorageSession for ReplaySession {
        fn query_rows<T>(
            &self,
            _table:  ReportTable,
            _filter: &ReportFilter,
            consume: impl FnOnce(&mut dyn RowCursor) -> DecodeResult<T>,
        ) -> StoreResult<T> {
            Ok(consume(&mut MemoryCursor::new(self.rows.clone()))?)
        }

        fn query_timestamps(&self, _table: ReportTable, _filter: &ReportFilter) -> StoreResult<Vec<Timestamp>> {
            Ok(self.rows.iter().map(|r| r.time).collect())
        }

        fn insert_rows(&self, _table: ReportTable, rows: &[ReportRow]) -> StoreResult<usize> {
            Ok(rows.len())
        }

        fn delete_rows(&self, _table: ReportTable, _filter: &ReportFilter) -> StoreResult<usize> {
            Ok(0)
        }

        fn in_transaction<T>(&self, body: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T> {
            body(self)
        }
    }

    #[test]
    fn two_groups_for_one_time_are_not_unique() {
        let mut rows = encode_report(&scenario_report(5), AggregationType::Raw);
        let mut stray = rows[0];
        stray.time = Timestamp(6);
        rows.insert(1, stray);

        let session = ReplaySession { rows };
        let st = ReportStore::new(&session, AggregationType::Raw);
        let err = st.read_report_at(NET, RUN, Timestamp(5), false).unwrap_err();
        assert!(matches!(err, StoreError::NotUnique { count: 2, time: Timestamp(5), .. }));
    }

    #[test]
    fn groups_at_other_times_are_not_returned() {
        let mut rows = encode_report(&scenario_report(6), AggregationType::Raw);
        rows.extend(encode_report(&scenario_report(7), AggregationType::Raw));
        let session = ReplaySession { rows };
        let st = ReportStore::new(&session, AggregationType::Raw);

        let err = st.read_report_at(NET, RUN, Timestamp(5), false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { time: Timestamp(5), .. }));
        assert_eq!(st.read_report_at(NET, RUN, Timestamp(7), false).unwrap(), scenario_report(7));
    }

    #[test]
    fn writes_go_through_the_session() {
        let session = ReplaySession { rows: Vec::new() };
        let st = ReportStore::new(&session, AggregationType::Raw);
        assert_eq!(st.write_report(&scenario_report(0), false).unwrap(), 2);
        let filter = ReportFilter::at(NetworkId(9), RunId(9), Timestamp(0));
        assert!(st.read_reports(&filter).unwrap().is_empty());
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod logging {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    use super::helpers::{filter, scenario_report, session, store};

    /// Collects formatted events in memory.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Capture;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured(body: impl FnOnce()) -> String {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, body);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn batch_write_logs_target_table() {
        let s = session();
        let out = captured(|| {
            store(&s).write_reports(&[scenario_report(1), scenario_report(2)], true).unwrap();
        });
        assert!(out.contains("wrote CTM reports"), "{out}");
        assert!(out.contains("table=link_data_total_debug"), "{out}");
        assert!(out.contains("rows=4"), "{out}");
    }

    #[test]
    fn timestamp_listing_is_logged() {
        let s = session();
        let st = store(&s);
        st.write_reports(&[scenario_report(1), scenario_report(2)], false).unwrap();

        let out = captured(|| {
            assert_eq!(st.list_timestamps(&filter(0, 10)).unwrap().len(), 2);
        });
        assert!(out.contains("listed CTM report timestamps"), "{out}");
        assert!(out.contains("timestamps=2"), "{out}");
        assert!(out.contains("elapsed_ms="), "{out}");
    }
}

// ── Configuration and file-backed sessions ────────────────────────────────────

#[cfg(test)]
mod config {
    use tempfile::TempDir;

    use ctm_core::AggregationType;

    use crate::{ReportStore, SqliteSession, StoreConfig, StoreError};
    use super::helpers::{filter, scenario_report};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let cfg = StoreConfig::from_json_str(r#"{ "db_path": "ctm.db" }"#).unwrap();
        assert_eq!(cfg, StoreConfig::new("ctm.db"));
        assert!(cfg.wal);
        assert_eq!(cfg.busy_timeout_ms, 5_000);
        assert_eq!(cfg.aggregation, AggregationType::Raw);
    }

    #[test]
    fn explicit_fields_are_read() {
        let cfg = StoreConfig::from_json_str(
            r#"{ "db_path": "x.db", "aggregation": "raw", "wal": false, "busy_timeout_ms": 10 }"#,
        )
        .unwrap();
        assert!(!cfg.wal);
        assert_eq!(cfg.busy_timeout_ms, 10);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = StoreConfig::from_json_str(r#"{ "db_path": "x.db", "pool_size": 4 }"#).unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[test]
    fn empty_db_path_is_rejected() {
        let err = StoreConfig::from_json_str(r#"{ "db_path": "" }"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
        let err = StoreConfig::from_json_str(r#"{ "db_path": "a.db", "busy_timeout_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let dir = tmp();
        let err = StoreConfig::from_json_path(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn file_database_persists_across_sessions() {
        let dir = tmp();
        let cfg_path = dir.path().join("store.json");
        let db_path = dir.path().join("ctm.db");
        std::fs::write(&cfg_path, format!(r#"{{ "db_path": {:?} }}"#, db_path.display().to_string())).unwrap();
        let cfg = StoreConfig::from_json_path(&cfg_path).unwrap();

        {
            let session = SqliteSession::open(&cfg).unwrap();
            ReportStore::new(&session, cfg.aggregation).write_report(&scenario_report(3), false).unwrap();
        }
        assert!(db_path.exists());

        let session = SqliteSession::open_path(&db_path).unwrap();
        let reports = ReportStore::new(&session, cfg.aggregation).read_reports(&filter(0, 10)).unwrap();
        assert_eq!(reports, vec![scenario_report(3)]);
    }
}

// ── Parallel reads ────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "parallel"))]
mod parallel {
    use ctm_core::{RunId, TimeInterval};

    use crate::{read_reports_parallel, ReportFilter, ReportStore, SqliteSession, StoreConfig};
    use super::helpers::{scenario_report, NET};

    #[test]
    fn filters_are_read_independently() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoreConfig::new(dir.path().join("ctm.db"));
        {
            let session = SqliteSession::open(&cfg).unwrap();
            let store = ReportStore::new(&session, cfg.aggregation);
            for run in 1..=4 {
                let mut r = scenario_report(run * 10);
                r.run_id = RunId(run);
                store.write_report(&r, false).unwrap();
            }
        }

        let filters: Vec<_> = (1..=4)
            .map(|run| ReportFilter::new(NET, RunId(run), TimeInterval::all()))
            .collect();
        let results = read_reports_parallel(&cfg, &filters);
        assert_eq!(results.len(), 4);
        for (run, result) in (1..=4).zip(results) {
            let reports = result.unwrap();
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].run_id, RunId(run));
        }
    }
}
