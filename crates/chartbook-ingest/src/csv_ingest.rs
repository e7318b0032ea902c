//! CSV ingestion.
//!
//! CSV uploads have no cell metadata, so types come from content: numbers
//! after cleaning spreadsheet decoration, common date shapes, booleans, and
//! text for everything else.

use chrono::NaiveDate;
use csv::ReaderBuilder;

use chartbook_model::{CellValue, parse_numeric_text};

use crate::error::Result;

/// Reads CSV bytes into a grid of typed cells, dropping fully blank records.
pub(crate) fn read_csv_grid(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<CellValue> = record.iter().map(typed_cell).collect();
        if row.iter().all(CellValue::is_missing) {
            continue;
        }
        grid.push(row);
    }
    Ok(grid)
}

/// Types one CSV field by content.
fn typed_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        return CellValue::Missing;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    if let Some(date) = parse_date(trimmed) {
        return CellValue::Date(date);
    }
    if let Some(number) = parse_numeric_text(trimmed) {
        return CellValue::Number(number);
    }
    CellValue::Text(trimmed.to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    None
}
