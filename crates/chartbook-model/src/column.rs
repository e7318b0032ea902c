use crate::CellValue;

/// Detected content type of a column, summarized over its non-missing cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Number,
    Date,
    Bool,
    Text,
    /// More than one variant observed.
    Mixed,
    /// Every cell missing.
    Empty,
}

/// A dataset column: header name plus detected type.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Summarizes the cells of one column into a [`ColumnType`].
pub fn detect_column_type<'a>(cells: impl Iterator<Item = &'a CellValue>) -> ColumnType {
    let mut detected: Option<ColumnType> = None;
    for cell in cells {
        let ty = match cell {
            CellValue::Number(_) => ColumnType::Number,
            CellValue::Date(_) => ColumnType::Date,
            CellValue::Bool(_) => ColumnType::Bool,
            CellValue::Text(_) => ColumnType::Text,
            CellValue::Missing => continue,
        };
        match detected {
            None => detected = Some(ty),
            Some(prev) if prev == ty => {}
            Some(_) => return ColumnType::Mixed,
        }
    }
    detected.unwrap_or(ColumnType::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_uniform_and_mixed() {
        let numbers = [CellValue::Number(1.0), CellValue::Number(2.0)];
        assert_eq!(detect_column_type(numbers.iter()), ColumnType::Number);

        let mixed = [CellValue::Number(1.0), CellValue::Text("x".into())];
        assert_eq!(detect_column_type(mixed.iter()), ColumnType::Mixed);
    }

    #[test]
    fn missing_cells_do_not_count() {
        let sparse = [
            CellValue::Missing,
            CellValue::Text("a".into()),
            CellValue::Missing,
        ];
        assert_eq!(detect_column_type(sparse.iter()), ColumnType::Text);

        let empty = [CellValue::Missing, CellValue::Missing];
        assert_eq!(detect_column_type(empty.iter()), ColumnType::Empty);
        assert_eq!(detect_column_type([].iter()), ColumnType::Empty);
    }
}
