//! Error types for spreadsheet ingestion.

use thiserror::Error;

/// Errors that can occur while turning an uploaded byte buffer into a dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Buffer is not a recognized spreadsheet format, or is malformed.
    #[error("failed to parse spreadsheet: {message}")]
    Parse { message: String },

    /// Selected sheet has no data rows (a header row alone does not count).
    #[error("sheet '{sheet}' has no data rows")]
    EmptySheet { sheet: String },

    /// Sheet selector does not match any sheet in the workbook.
    #[error("sheet not found: {selector}")]
    SheetNotFound { selector: String },
}

impl IngestError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

impl From<zip::result::ZipError> for IngestError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<quick_xml::Error> for IngestError {
    fn from(err: quick_xml::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for IngestError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<quick_xml::encoding::EncodingError> for IngestError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::parse(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::parse(err.to_string())
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
