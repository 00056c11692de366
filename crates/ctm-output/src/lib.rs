//! `ctm-output` — flat export of freeway CTM report rows.
//!
//! Two backends, the second behind a Cargo feature:
//!
//! | Feature   | Backend | File created          |
//! |-----------|---------|-----------------------|
//! | *(none)*  | CSV     | `report_rows.csv`     |
//! | `parquet` | Parquet | `report_rows.parquet` |
//!
//! Both implement [`RowWriter`] and write the debug-table column layout.
//! [`ReportExporter`] encodes reports with the pivot engine and feeds any
//! writer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ctm_output::{CsvRowWriter, ReportExporter};
//!
//! let writer = CsvRowWriter::new(Path::new("./output"))?;
//! let mut exporter = ReportExporter::new(writer, AggregationType::Raw);
//! exporter.export_reports(&reports)?;
//! exporter.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod exporter;
pub mod writer;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use csv::CsvRowWriter;
pub use error::{OutputError, OutputResult};
pub use exporter::ReportExporter;
pub use writer::RowWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetRowWriter;
