//! Error types for the billrec-core library.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::diagnostic::Severity;
use crate::models::record::SourceLocation;

/// Main error type for the billrec library.
///
/// Per-block and per-document failures are not raised through this type; they are
/// collected as [`ExtractionError`] values in the document and batch reports.
#[derive(Error, Debug)]
pub enum BillrecError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Template layout could not be compiled.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised while compiling a template layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A rule pattern is not a valid regular expression.
    #[error("invalid pattern for rule '{rule}': {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A net total pattern has no capture group for the value.
    #[error("pattern for rule '{0}' has no capture group")]
    MissingCapture(String),

    /// A line item rule points at column zero.
    #[error("rule '{0}' must use a value column of 1 or more")]
    InvalidColumn(String),

    /// The layout has no net total strategies.
    #[error("layout has no net total rules")]
    NoNetTotalRules,
}

/// Kind of a per-block or per-document extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionErrorKind {
    /// The account id is not present in the account directory.
    UnknownAccount,
    /// The document has no pages, or no page carries any text.
    EmptyDocument,
    /// The page text provider could not open or read the document.
    UnreadableDocument,
    /// A page without any account marker did not yield an account id.
    NoAccountMarkerFound,
}

impl ExtractionErrorKind {
    /// Severity used when this failure is mirrored to the diagnostic stream.
    pub fn severity(self) -> Severity {
        match self {
            Self::UnknownAccount | Self::EmptyDocument => Severity::Error,
            Self::UnreadableDocument => Severity::Critical,
            Self::NoAccountMarkerFound => Severity::Warning,
        }
    }
}

/// Typed failure for one block or one document.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ExtractionError {
    /// What went wrong.
    pub kind: ExtractionErrorKind,
    /// Account id, when one was read from the block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Document and page the failure refers to.
    pub location: SourceLocation,
    /// Human readable message, suitable for a log line.
    pub message: String,
}

impl ExtractionError {
    pub fn unknown_account(account_id: impl Into<String>, location: SourceLocation) -> Self {
        let account_id = account_id.into();
        Self {
            kind: ExtractionErrorKind::UnknownAccount,
            message: format!("UC {} ({}) not found in the account directory", account_id, location),
            account_id: Some(account_id),
            location,
        }
    }

    pub fn empty_document(location: SourceLocation) -> Self {
        Self {
            kind: ExtractionErrorKind::EmptyDocument,
            message: format!("document has no readable pages: {}", location),
            account_id: None,
            location,
        }
    }

    pub fn unreadable_document(location: SourceLocation, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: ExtractionErrorKind::UnreadableDocument,
            message: format!("failed to read {}: {}", location, reason),
            account_id: None,
            location,
        }
    }

    pub fn no_account_marker(location: SourceLocation) -> Self {
        Self {
            kind: ExtractionErrorKind::NoAccountMarkerFound,
            message: format!("no invoice data found in {}", location),
            account_id: None,
            location,
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Result type for the billrec library.
pub type Result<T> = std::result::Result<T, BillrecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_account_message() {
        let err = ExtractionError::unknown_account("99999", SourceLocation::page("fatura.pdf", 0));
        assert_eq!(err.kind, ExtractionErrorKind::UnknownAccount);
        assert_eq!(err.account_id.as_deref(), Some("99999"));
        assert_eq!(
            err.to_string(),
            "UC 99999 (fatura.pdf, page 1) not found in the account directory"
        );
    }

    #[test]
    fn test_kind_severity() {
        assert_eq!(ExtractionErrorKind::UnreadableDocument.severity(), Severity::Critical);
        assert_eq!(ExtractionErrorKind::NoAccountMarkerFound.severity(), Severity::Warning);
    }
}
