//! Structured diagnostics emitted while processing a batch.
//!
//! Diagnostics are returned as data next to the records and errors, so a caller can
//! stream them to a progress view. Every diagnostic pushed through [`Diagnostics`] is
//! also mirrored to `tracing`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{ExtractionError, ExtractionErrorKind};
use crate::models::record::SourceLocation;

/// Diagnostic severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    /// A page carried no text and was skipped.
    BlankPage,
    /// No net total rule matched; the net amount is 0.00.
    NetTotalDefaulted,
    /// A named line item was not found; its value is 0.00.
    LineItemDefaulted,
    /// Energy items plus COSIP do not add up to the gross amount.
    LineItemsDisagree,
    /// The charged amount on the first page could not be confirmed.
    DuplicateCheckInconclusive,
    /// Calculated and verified batch totals differ.
    ReconciliationMismatch,
    /// Mirror of an extraction failure.
    Extraction(ExtractionErrorKind),
}

/// A single diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            location,
            message: message.into(),
        }
    }

    pub fn info(code: DiagnosticCode, location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, Some(location), message)
    }

    pub fn warning(code: DiagnosticCode, location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, Some(location), message)
    }

    fn log(&self) {
        match self.severity {
            Severity::Info => debug!(code = ?self.code, "{}", self),
            Severity::Warning => warn!(code = ?self.code, "{}", self),
            Severity::Error | Severity::Critical => error!(code = ?self.code, "{}", self),
        }
    }
}

impl From<&ExtractionError> for Diagnostic {
    fn from(err: &ExtractionError) -> Self {
        Self::new(
            err.severity(),
            DiagnosticCode::Extraction(err.kind),
            Some(err.location.clone()),
            err.message.clone(),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "[{}] {}: {}", self.severity, location, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Ordered collection of diagnostics that logs each entry as it is pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.0.push(diagnostic);
    }

    /// Append already-logged diagnostics without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of diagnostics at or above the given severity.
    pub fn count_at_least(&self, severity: Severity) -> usize {
        self.0.iter().filter(|d| d.severity >= severity).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
