//! Concurrent reads (feature `parallel`).
//!
//! Each filter gets its own [`SqliteSession`] on a Rayon worker, so no
//! connection or cursor is shared between threads.

use rayon::prelude::*;

use ctm_report::FreewayCtmReport;

use crate::session::ReportFilter;
use crate::sqlite::SqliteSession;
use crate::store::ReportStore;
use crate::{StoreConfig, StoreResult};

/// Read the reports of every filter concurrently.
///
/// Results are returned in `filters` order; one failing filter does not
/// affect the others.
pub fn read_reports_parallel(
    config:  &StoreConfig,
    filters: &[ReportFilter],
) -> Vec<StoreResult<Vec<FreewayCtmReport>>> {
    filters
        .par_iter()
        .map(|filter| {
            let session = SqliteSession::open(config)?;
            ReportStore::new(&session, config.aggregation).read_reports(filter)
        })
        .collect()
}
