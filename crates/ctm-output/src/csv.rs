//! CSV export backend.
//!
//! Creates `report_rows.csv` in the output directory.  Null values are
//! written as empty fields.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use ctm_report::{Column, ReportRow};

use crate::writer::RowWriter;
use crate::{OutputError, OutputResult};

pub const CSV_FILE_NAME: &str = "report_rows.csv";

/// Writes report rows to one CSV file.
pub struct CsvRowWriter {
    rows:     Writer<File>,
    finished: bool,
}

impl CsvRowWriter {
    /// Create `report_rows.csv` in `dir` and write the header row.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut rows = Writer::from_path(dir.join(CSV_FILE_NAME))?;
        rows.write_record(Column::DEBUG.iter().map(|c| c.name()))?;
        Ok(Self { rows, finished: false })
    }
}

fn field(row: &ReportRow, column: Column) -> String {
    if column.is_integer() {
        row.integer(column).map(|v| v.to_string()).unwrap_or_default()
    } else {
        row.real(column).map(|v| v.to_string()).unwrap_or_default()
    }
}

impl RowWriter for CsvRowWriter {
    fn write_rows(&mut self, rows: &[ReportRow]) -> OutputResult<()> {
        if self.finished {
            return Err(OutputError::Finished);
        }
        for row in rows {
            self.rows.write_record(Column::DEBUG.iter().map(|&c| field(row, c)))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.rows.flush()?;
        Ok(())
    }
}
