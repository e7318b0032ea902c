//! Spreadsheet ingestion: uploaded bytes -> immutable [`Dataset`](chartbook_model::Dataset).
//!
//! Supports XLSX workbooks (ZIP container, worksheet XML, shared strings,
//! date-styled cells) and CSV exports. Format is sniffed from the buffer's
//! leading bytes. See [`ingest_bytes`] for the main entry point and
//! [`Session`] for upload-replaces-dataset state.

pub mod csv_ingest;
pub mod dataset;
pub mod error;
pub mod session;
pub mod workbook;
mod worksheet;

pub use dataset::{IngestOptions, ingest_bytes, ingest_csv, ingest_workbook};
pub use error::{IngestError, Result};
pub use session::Session;
pub use workbook::SheetSelector;
