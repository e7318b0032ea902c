//! Dataset assembly: byte buffer -> [`Dataset`].
//!
//! The entry point is [`ingest_bytes`], which sniffs the buffer format from
//! its leading bytes (never from a file name) and dispatches to the XLSX or
//! CSV reader. Both paths feed the same assembly: first non-blank row becomes
//! the header, remaining rows become records padded to the header width, and
//! per-column types are detected from the cells.

use tracing::{debug, info};

use chartbook_model::{
    CellValue, Column, Dataset, RowRecord, detect_column_type, fingerprint_bytes,
};

use crate::csv_ingest::read_csv_grid;
use crate::error::{IngestError, Result};
use crate::workbook::{SheetSelector, read_workbook_sheet};

/// ZIP local file header, the container signature of an XLSX package.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// OLE compound document signature (legacy .xls).
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Sheet name assigned to CSV input, which has exactly one implicit sheet.
const CSV_SHEET_NAME: &str = "Sheet1";

/// Options for one ingestion call.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Which sheet to read; defaults to the first.
    pub sheet: SheetSelector,
}

/// Ingests an uploaded byte buffer into a dataset, sniffing the format.
pub fn ingest_bytes(bytes: &[u8], options: &IngestOptions) -> Result<Dataset> {
    if bytes.starts_with(&ZIP_MAGIC) {
        return ingest_workbook(bytes, options);
    }
    if bytes.starts_with(&OLE_MAGIC) {
        return Err(IngestError::parse(
            "legacy binary workbook (.xls) is not supported",
        ));
    }
    ingest_csv(bytes, options)
}

/// Ingests an XLSX workbook buffer.
pub fn ingest_workbook(bytes: &[u8], options: &IngestOptions) -> Result<Dataset> {
    let (sheet_name, grid) = read_workbook_sheet(bytes, &options.sheet)?;
    debug!(sheet = %sheet_name, raw_rows = grid.len(), "worksheet grid read");
    build_dataset(&sheet_name, grid, bytes)
}

/// Ingests a CSV buffer. CSV behaves as a workbook with a single sheet, so
/// any selector other than the first sheet misses.
pub fn ingest_csv(bytes: &[u8], options: &IngestOptions) -> Result<Dataset> {
    match &options.sheet {
        SheetSelector::Index(0) => {}
        SheetSelector::Name(name) if name == CSV_SHEET_NAME => {}
        other => {
            return Err(IngestError::SheetNotFound {
                selector: other.to_string(),
            });
        }
    }
    let grid = read_csv_grid(bytes)?;
    build_dataset(CSV_SHEET_NAME, grid, bytes)
}

fn build_dataset(sheet_name: &str, grid: Vec<Vec<CellValue>>, bytes: &[u8]) -> Result<Dataset> {
    let mut rows_iter = grid
        .into_iter()
        .filter(|row| !row.iter().all(CellValue::is_missing));

    let header_row = rows_iter.next().ok_or_else(|| IngestError::EmptySheet {
        sheet: sheet_name.to_string(),
    })?;
    let headers = header_names(&header_row);

    let mut records = Vec::new();
    for row in rows_iter {
        let mut cells = std::collections::BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = row.get(idx).cloned().unwrap_or(CellValue::Missing);
            cells.insert(header.clone(), value);
        }
        records.push(RowRecord::new(cells));
    }
    if records.is_empty() {
        return Err(IngestError::EmptySheet {
            sheet: sheet_name.to_string(),
        });
    }

    let columns: Vec<Column> = headers
        .iter()
        .map(|name| {
            let ty = detect_column_type(records.iter().map(|r| r.cell(name)));
            Column::new(name.clone(), ty)
        })
        .collect();

    info!(
        sheet = %sheet_name,
        rows = records.len(),
        columns = columns.len(),
        "dataset ingested"
    );
    Ok(Dataset::new(
        sheet_name,
        fingerprint_bytes(bytes),
        columns,
        records,
    ))
}

/// Derives unique field names from the header row.
///
/// Headers are trimmed and whitespace-collapsed; blanks get a positional
/// name, duplicates get a numeric suffix.
fn header_names(header_row: &[CellValue]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header_row.len());
    for (idx, cell) in header_row.iter().enumerate() {
        let normalized = normalize_header(&cell.to_label());
        let base = if normalized.is_empty() {
            format!("column{}", idx + 1)
        } else {
            normalized
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while names.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}
