//! Parquet export backend (feature `parquet`).
//!
//! Creates `report_rows.parquet` in the output directory.  Key columns are
//! non-null `Int64`, `ctm_id` is nullable `Int64` and the data columns are
//! nullable `Float64`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use ctm_report::{Column, ReportRow};

use crate::writer::RowWriter;
use crate::{OutputError, OutputResult};

pub const PARQUET_FILE_NAME: &str = "report_rows.parquet";

fn row_schema() -> Arc<Schema> {
    let fields: Vec<Field> = Column::DEBUG
        .iter()
        .map(|&c| match c {
            Column::EnsembleIndex => Field::new(c.name(), DataType::Int64, true),
            c if c.is_integer()   => Field::new(c.name(), DataType::Int64, false),
            c                     => Field::new(c.name(), DataType::Float64, true),
        })
        .collect();
    Arc::new(Schema::new(fields))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn column_array(rows: &[ReportRow], column: Column) -> ArrayRef {
    if column.is_integer() {
        let mut values = Int64Builder::with_capacity(rows.len());
        for row in rows {
            values.append_option(row.integer(column));
        }
        Arc::new(values.finish())
    } else {
        let mut values = Float64Builder::with_capacity(rows.len());
        for row in rows {
            values.append_option(row.real(column));
        }
        Arc::new(values.finish())
    }
}

/// Writes report rows to one Parquet file, one row group per batch.
///
/// `finish()` **must** be called to write the file footer.
pub struct ParquetRowWriter {
    rows:   Option<ArrowWriter<File>>,
    schema: Arc<Schema>,
}

impl ParquetRowWriter {
    /// Create `report_rows.parquet` in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let schema = row_schema();
        let file = File::create(dir.join(PARQUET_FILE_NAME))?;
        let rows = ArrowWriter::try_new(file, Arc::clone(&schema), Some(snappy_props()))?;
        Ok(Self { rows: Some(rows), schema })
    }
}

impl RowWriter for ParquetRowWriter {
    fn write_rows(&mut self, rows: &[ReportRow]) -> OutputResult<()> {
        let Some(writer) = self.rows.as_mut() else {
            return Err(OutputError::Finished);
        };
        if rows.is_empty() {
            return Ok(());
        }

        let columns = Column::DEBUG.iter().map(|&c| column_array(rows, c)).collect();
        let batch = RecordBatch::try_new(Arc::clone(&self.schema), columns)?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.rows.take() {
            w.close()?;
        }
        Ok(())
    }
}
