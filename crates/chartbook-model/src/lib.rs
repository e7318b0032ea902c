//! Core data model for chartbook.
//!
//! This crate holds the value types shared by ingestion, aggregation, and
//! chart building:
//!
//! - **value**: scalar cell values and numeric coercion rules
//! - **column**: column metadata and content-type detection
//! - **dataset**: the immutable result of one spreadsheet ingestion
//! - **series**: grouped/reduced output ready for charting

#![deny(unsafe_code)]

pub mod column;
pub mod dataset;
pub mod series;
pub mod value;

pub use column::{Column, ColumnType, detect_column_type};
pub use dataset::{Dataset, RowRecord, fingerprint_bytes};
pub use series::{AggregateSeries, SeriesPoint};
pub use value::{CellValue, format_numeric, parse_numeric_text};
