//! `ReportExporter<W>`: encodes reports and feeds the rows to a
//! [`RowWriter`].

use tracing::debug;

use ctm_core::AggregationType;
use ctm_report::{encode_ensemble, encode_report, FreewayCtmEnsembleReport, FreewayCtmReport};

use crate::writer::RowWriter;
use crate::OutputResult;

/// Flattens reports into rows exactly as the store would write them and
/// hands each report's rows to the writer as one batch.
pub struct ReportExporter<W: RowWriter> {
    writer:       W,
    aggregation:  AggregationType,
    rows_written: usize,
}

impl<W: RowWriter> ReportExporter<W> {
    pub fn new(writer: W, aggregation: AggregationType) -> Self {
        Self { writer, aggregation, rows_written: 0 }
    }

    /// Rows handed to the writer so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn export_report(&mut self, report: &FreewayCtmReport) -> OutputResult<usize> {
        let rows = encode_report(report, self.aggregation);
        self.writer.write_rows(&rows)?;
        self.rows_written += rows.len();
        Ok(rows.len())
    }

    pub fn export_reports(&mut self, reports: &[FreewayCtmReport]) -> OutputResult<usize> {
        let mut n = 0;
        for report in reports {
            n += self.export_report(report)?;
        }
        Ok(n)
    }

    /// Ensemble rows carry their member index in `ctm_id`.
    pub fn export_ensemble(&mut self, report: &FreewayCtmEnsembleReport) -> OutputResult<usize> {
        let rows = encode_ensemble(report, self.aggregation);
        self.writer.write_rows(&rows)?;
        self.rows_written += rows.len();
        Ok(rows.len())
    }

    pub fn export_ensembles(&mut self, reports: &[FreewayCtmEnsembleReport]) -> OutputResult<usize> {
        let mut n = 0;
        for report in reports {
            n += self.export_ensemble(report)?;
        }
        Ok(n)
    }

    /// Finish the writer.  Safe to call more than once.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()?;
        debug!(rows = self.rows_written, "report export finished");
        Ok(())
    }

    /// Unwrap the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
