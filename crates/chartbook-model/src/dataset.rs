use std::collections::BTreeMap;

use sha2::Digest;

use crate::{CellValue, Column};

/// One row's worth of column -> value mappings.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RowRecord {
    pub cells: BTreeMap<String, CellValue>,
}

impl RowRecord {
    pub fn new(cells: BTreeMap<String, CellValue>) -> Self {
        Self { cells }
    }

    /// Cell for `column`, treating absent entries as missing.
    pub fn cell(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Missing)
    }
}

/// Immutable result of parsing one spreadsheet upload.
///
/// Created on successful ingestion and never mutated; a new upload produces a
/// whole new dataset. Columns keep sheet order, rows keep sheet order, and
/// `fingerprint` identifies the exact source bytes, so value equality holds
/// between two ingestions of the same buffer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dataset {
    sheet_name: String,
    fingerprint: String,
    columns: Vec<Column>,
    rows: Vec<RowRecord>,
}

impl Dataset {
    pub fn new(
        sheet_name: impl Into<String>,
        fingerprint: impl Into<String>,
        columns: Vec<Column>,
        rows: Vec<RowRecord>,
    ) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            fingerprint: fingerprint.into(),
            columns,
            rows,
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Hex SHA-256 of the ingested byte buffer.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Hex SHA-256 fingerprint of an uploaded byte buffer.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnType;

    fn sample_dataset() -> Dataset {
        let columns = vec![
            Column::new("region", ColumnType::Text),
            Column::new("sales", ColumnType::Number),
        ];
        let mut cells = BTreeMap::new();
        cells.insert("region".to_string(), CellValue::Text("East".into()));
        cells.insert("sales".to_string(), CellValue::Number(10.0));
        Dataset::new("Sheet1", "abc123", columns, vec![RowRecord::new(cells)])
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint_bytes(b"region,sales\nEast,10\n");
        let b = fingerprint_bytes(b"region,sales\nEast,10\n");
        let c = fingerprint_bytes(b"region,sales\nWest,20\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn absent_cells_read_as_missing() {
        let ds = sample_dataset();
        assert_eq!(ds.rows()[0].cell("profit"), &CellValue::Missing);
        assert_eq!(
            ds.rows()[0].cell("region"),
            &CellValue::Text("East".into())
        );
    }

    #[test]
    fn value_equality_over_all_parts() {
        let a = sample_dataset();
        let b = sample_dataset();
        assert_eq!(a, b);

        let c = Dataset::new("Sheet2", a.fingerprint(), a.columns().to_vec(), a.rows().to_vec());
        assert_ne!(a, c);
    }
}
