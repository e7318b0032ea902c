use chrono::NaiveDate;

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
    Missing,
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    /// Coerces the cell to a number for reduction purposes.
    ///
    /// Accepts numeric cells directly, and text cells that clean up into a
    /// number: thousands separators and inner spaces are stripped, and
    /// accountant-style parenthesized values are read as negatives
    /// (`(1,234)` -> -1234). A lone `-` and empty text count as missing,
    /// not as zero.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => parse_numeric_text(s),
            CellValue::Date(_) | CellValue::Missing => None,
        }
    }

    /// Label form used when the cell is a group-by key.
    pub fn to_label(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(v) => format_numeric(*v),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            CellValue::Missing => String::new(),
        }
    }
}

/// Parses a string as f64 after cleaning spreadsheet-style decoration.
///
/// Returns None for empty strings, `-` placeholders, and anything that is
/// still non-numeric after cleaning.
pub fn parse_numeric_text(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    // Parenthesized negatives: (123) -> -123
    let cleaned = if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        format!("-{}", &cleaned[1..cleaned.len() - 1])
    } else {
        cleaned
    };
    cleaned.parse::<f64>().ok()
}

/// Formats a floating-point number as a string without trailing fractional
/// zeros. Integer values keep their digits untouched.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
