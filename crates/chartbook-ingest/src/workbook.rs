//! XLSX container handling.
//!
//! An XLSX workbook is a ZIP package of XML parts. This module opens the
//! package from an in-memory buffer, resolves sheet names to worksheet parts
//! via the workbook relationships, and loads the shared-string table and the
//! style table (needed to tell date cells apart from plain numbers).

use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use chartbook_model::CellValue;

use crate::error::{IngestError, Result};
use crate::worksheet::parse_sheet_cells;

/// Sheet selector: by zero-based position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "#{i}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug)]
struct SheetEntry {
    name: String,
    rel_id: String,
}

/// Reads the selected worksheet out of an XLSX buffer.
///
/// Returns the resolved sheet name and the cell grid (rows in sheet order,
/// every row padded to the same width).
pub(crate) fn read_workbook_sheet(
    bytes: &[u8],
    selector: &SheetSelector,
) -> Result<(String, Vec<Vec<CellValue>>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?
        .ok_or_else(|| IngestError::parse("missing xl/workbook.xml: not an XLSX workbook"))?;
    let sheets = parse_workbook_sheets(&workbook_xml)?;
    if sheets.is_empty() {
        return Err(IngestError::parse("workbook declares no sheets"));
    }

    let entry = match selector {
        SheetSelector::Index(i) => sheets.get(*i),
        SheetSelector::Name(name) => sheets.iter().find(|s| s.name == *name),
    }
    .ok_or_else(|| IngestError::SheetNotFound {
        selector: selector.to_string(),
    })?;

    let rels_xml = read_part(&mut archive, "xl/_rels/workbook.xml.rels")?
        .ok_or_else(|| IngestError::parse("missing workbook relationships part"))?;
    let rels = parse_relationships(&rels_xml)?;
    let part = rels
        .get(&entry.rel_id)
        .map(|target| resolve_part_path(target))
        .ok_or_else(|| {
            IngestError::parse(format!("no relationship for sheet '{}'", entry.name))
        })?;

    let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let date_styles = match read_part(&mut archive, "xl/styles.xml")? {
        Some(xml) => parse_date_styles(&xml)?,
        None => Vec::new(),
    };

    let sheet_xml = read_part(&mut archive, &part)?
        .ok_or_else(|| IngestError::parse(format!("missing worksheet part {part}")))?;
    debug!(
        sheet = %entry.name,
        part = %part,
        shared_strings = shared_strings.len(),
        "worksheet part resolved"
    );
    let grid = parse_sheet_cells(&sheet_xml, &shared_strings, &date_styles)?;
    Ok((entry.name.clone(), grid))
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Worksheet targets in the rels part are relative to `xl/` unless absolute.
fn resolve_part_path(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key || attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_workbook_sheets(xml: &str) -> Result<Vec<SheetEntry>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut sheets = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr_value(&e, b"name")?;
                // `r:id` matches by local name.
                let rel_id = attr_value(&e, b"id")?;
                if let (Some(name), Some(rel_id)) = (name, rel_id) {
                    sheets.push(SheetEntry { name, rel_id });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

fn parse_relationships(xml: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut rels = BTreeMap::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_value(&e, b"Id")?;
                let target = attr_value(&e, b"Target")?;
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rels)
}

/// Flattens each `<si>` item to its text content, excluding phonetic runs.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_text = false;
    let mut phonetic_depth = 0usize;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => phonetic_depth += 1,
                b"t" if in_si && phonetic_depth == 0 => in_text = true,
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.xml_content()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = false;
                    strings.push(current.clone());
                }
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Parses `xl/styles.xml` into a per-cell-format flag: does the format at
/// style index `s` render as a date?
fn parse_date_styles(xml: &str) -> Result<Vec<bool>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut custom_formats: BTreeMap<u32, String> = BTreeMap::new();
    let mut date_styles = Vec::new();
    let mut in_cell_xfs = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = attr_value(&e, b"numFmtId")?.and_then(|v| v.parse::<u32>().ok());
                    let code = attr_value(&e, b"formatCode")?;
                    if let (Some(id), Some(code)) = (id, code) {
                        custom_formats.insert(id, code);
                    }
                }
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let fmt_id = attr_value(&e, b"numFmtId")?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0);
                    date_styles.push(is_date_format(fmt_id, &custom_formats));
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(date_styles)
}

fn is_date_format(fmt_id: u32, custom_formats: &BTreeMap<u32, String>) -> bool {
    if is_builtin_date_format(fmt_id) {
        return true;
    }
    custom_formats
        .get(&fmt_id)
        .is_some_and(|code| format_code_is_date(code))
}

/// Built-in date/time format ids per the OOXML spec.
fn is_builtin_date_format(fmt_id: u32) -> bool {
    matches!(fmt_id, 14..=22 | 27..=36 | 45..=47 | 50..=58 | 71..=81)
}

/// Heuristic date detection for custom format codes: any unquoted,
/// unbracketed date/time token in the first section marks the format as a
/// date. Elapsed-time sections like `[h]:mm` stay bracketed and do not count.
fn format_code_is_date(code: &str) -> bool {
    let mut escaped = false;
    let mut in_quote = false;
    let mut brackets = 0u8;
    for ch in code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '_' | '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            _ if in_quote => {}
            ';' => return false,
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            'y' | 'm' | 'd' | 'h' | 's' | 'Y' | 'M' | 'D' | 'H' | 'S' if brackets == 0 => {
                return true;
            }
            _ => {}
        }
    }
    false
}
