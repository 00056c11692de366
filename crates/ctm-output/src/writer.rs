//! The `RowWriter` trait implemented by all export backends.

use ctm_report::ReportRow;

use crate::OutputResult;

/// Sink for flat report rows.
///
/// Every backend writes the full debug column set, so standard and ensemble
/// rows can share one file; `ctm_id` is null for standard rows.
pub trait RowWriter {
    /// Append a batch of rows.  Writing after [`finish`][Self::finish] is an
    /// error.
    fn write_rows(&mut self, rows: &[ReportRow]) -> OutputResult<()>;

    /// Flush and close the underlying file.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
