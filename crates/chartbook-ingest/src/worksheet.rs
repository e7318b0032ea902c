//! Worksheet XML parsing.
//!
//! Turns a `xl/worksheets/sheetN.xml` part into a rectangular grid of cell
//! values. Cell addressing comes from the `r="A1"` references; rows and
//! columns the sheet never mentions are padded with missing cells so every
//! row in the output has the same width.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use chartbook_model::CellValue;

use crate::error::{IngestError, Result};

/// Raw cell type attribute (`t=`) of a worksheet cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CellType {
    #[default]
    Numeric,
    SharedString,
    FormulaString,
    InlineString,
    Bool,
    IsoDate,
    Error,
}

impl CellType {
    fn from_attr(value: &str) -> Self {
        match value {
            "s" => Self::SharedString,
            "str" => Self::FormulaString,
            "inlineStr" => Self::InlineString,
            "b" => Self::Bool,
            "d" => Self::IsoDate,
            "e" => Self::Error,
            _ => Self::Numeric,
        }
    }
}

#[derive(Debug, Default)]
struct PendingCell {
    row: u32,
    col: u32,
    ty: CellType,
    date_styled: bool,
    raw: String,
    saw_value: bool,
}

/// Parses worksheet XML into a dense grid.
///
/// `shared_strings` resolves `t="s"` cells; `date_styles` flags which style
/// indices carry a date number format.
pub(crate) fn parse_sheet_cells(
    xml: &str,
    shared_strings: &[String],
    date_styles: &[bool],
) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut cells: BTreeMap<u32, BTreeMap<u32, CellValue>> = BTreeMap::new();
    let mut max_col = 0u32;

    let mut current_row = 0u32;
    let mut next_col = 0u32;
    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_inline_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                if let Some(r) = attr_value(&e, b"r")? {
                    current_row = r
                        .parse::<u32>()
                        .map_err(|_| IngestError::parse(format!("bad row number: {r}")))?;
                } else {
                    current_row += 1;
                }
                next_col = 0;
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                pending = Some(start_cell(&e, current_row, next_col, date_styles)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                // No content: advance the implicit column cursor only.
                let cell = start_cell(&e, current_row, next_col, date_styles)?;
                next_col = cell.col + 1;
            }
            Event::Start(e) if e.local_name().as_ref() == b"v" => in_value = true,
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                if pending
                    .as_ref()
                    .is_some_and(|c| c.ty == CellType::InlineString)
                {
                    in_inline_text = true;
                }
            }
            Event::Text(t) => {
                if in_value || in_inline_text {
                    if let Some(cell) = pending.as_mut() {
                        cell.raw.push_str(&t.xml_content()?);
                        cell.saw_value = true;
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"t" => in_inline_text = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        next_col = cell.col + 1;
                        max_col = max_col.max(cell.col);
                        let value = finish_cell(&cell, shared_strings)?;
                        if !value.is_missing() {
                            cells.entry(cell.row).or_default().insert(cell.col, value);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(to_grid(&cells, max_col))
}

fn start_cell(
    e: &BytesStart<'_>,
    current_row: u32,
    next_col: u32,
    date_styles: &[bool],
) -> Result<PendingCell> {
    let (row, col) = match attr_value(e, b"r")? {
        Some(reference) => reference_to_coords(&reference)?,
        None => (current_row, next_col),
    };
    let ty = attr_value(e, b"t")?
        .map(|t| CellType::from_attr(&t))
        .unwrap_or_default();
    let date_styled = attr_value(e, b"s")?
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|idx| date_styles.get(idx).copied())
        .unwrap_or(false);
    Ok(PendingCell {
        row,
        col,
        ty,
        date_styled,
        raw: String::new(),
        saw_value: false,
    })
}

fn finish_cell(cell: &PendingCell, shared_strings: &[String]) -> Result<CellValue> {
    if !cell.saw_value {
        return Ok(CellValue::Missing);
    }
    let raw = cell.raw.trim();
    let value = match cell.ty {
        CellType::SharedString => {
            let idx = raw
                .parse::<usize>()
                .map_err(|_| IngestError::parse(format!("bad shared string index: {raw}")))?;
            let text = shared_strings.get(idx).ok_or_else(|| {
                IngestError::parse(format!("shared string index {idx} out of range"))
            })?;
            text_cell(text)
        }
        CellType::FormulaString | CellType::InlineString => text_cell(raw),
        CellType::Bool => CellValue::Bool(raw == "1" || raw.eq_ignore_ascii_case("true")),
        CellType::IsoDate => {
            let prefix = raw.get(..10).unwrap_or(raw);
            match NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                Ok(date) => CellValue::Date(date),
                Err(_) => text_cell(raw),
            }
        }
        CellType::Error => CellValue::Missing,
        CellType::Numeric => match raw.parse::<f64>() {
            Ok(number) if cell.date_styled => match serial_to_date(number) {
                Some(date) => CellValue::Date(date),
                None => CellValue::Number(number),
            },
            Ok(number) => CellValue::Number(number),
            Err(_) => text_cell(raw),
        },
    };
    Ok(value)
}

fn text_cell(text: &str) -> CellValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        CellValue::Missing
    } else {
        CellValue::Text(trimmed.to_string())
    }
}

fn to_grid(cells: &BTreeMap<u32, BTreeMap<u32, CellValue>>, max_col: u32) -> Vec<Vec<CellValue>> {
    let width = (max_col + 1) as usize;
    let mut grid = Vec::with_capacity(cells.len());
    for row_cells in cells.values() {
        let mut row = vec![CellValue::Missing; width];
        for (col, value) in row_cells {
            row[*col as usize] = value.clone();
        }
        grid.push(row);
    }
    grid
}

fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Converts an `A1`-style reference to (row, zero-based column).
fn reference_to_coords(reference: &str) -> Result<(u32, u32)> {
    let bytes = reference.as_bytes();
    let split = bytes
        .iter()
        .position(|b| b.is_ascii_digit())
        .ok_or_else(|| IngestError::parse(format!("invalid cell reference: {reference}")))?;
    if split == 0 {
        return Err(IngestError::parse(format!(
            "invalid cell reference: {reference}"
        )));
    }
    let mut col = 0u32;
    for &b in &bytes[..split] {
        if !b.is_ascii_alphabetic() {
            return Err(IngestError::parse(format!(
                "invalid column in reference: {reference}"
            )));
        }
        col = col * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1);
    }
    let row = reference[split..]
        .parse::<u32>()
        .map_err(|_| IngestError::parse(format!("invalid row in reference: {reference}")))?;
    Ok((row, col - 1))
}

/// Converts an Excel 1900-system serial number to a calendar date.
///
/// Serial 60 is the phantom 1900-02-29; later serials are shifted by one.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.trunc() as i64;
    if days < 1 {
        return None;
    }
    let offset = if days >= 60 { days - 1 } else { days };
    NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(chrono::Days::new(offset as u64))
}
