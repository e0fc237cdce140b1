//! Document and batch processing.
//!
//! Each document is processed independently: pages are segmented into blocks, every
//! block is parsed, and the first page feeds the duplicate-value check. A batch is a
//! fold of document reports followed by reconciliation. Failures are collected as
//! values; a failing block never stops its siblings, and a failing document never
//! stops the batch.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::directory::AccountDirectory;
use crate::error::{BillrecError, ExtractionError, PdfError, Result};
use crate::invoice::{BillParser, BlockParser, Segmenter};
use crate::models::config::BillrecConfig;
use crate::models::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
use crate::models::record::{InvoiceRecord, SourceLocation};
use crate::models::report::{ReconciliationResult, VerifiedChargedAmount};
use crate::reconcile::{reconcile, DuplicateValueVerifier};

/// Everything produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub records: Vec<InvoiceRecord>,
    pub errors: Vec<ExtractionError>,
    /// Absent when the document could not be read.
    pub verified: Option<VerifiedChargedAmount>,
    pub diagnostics: Diagnostics,
}

impl DocumentReport {
    /// An empty report for `document`.
    pub fn new(document: &str) -> Self {
        Self {
            document: document.to_string(),
            records: Vec::new(),
            errors: Vec::new(),
            verified: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// A report holding a single document-level failure.
    pub fn failed(err: ExtractionError) -> Self {
        let mut report = Self::new(&err.location.document);
        report.push_error(err);
        report
    }

    fn push_error(&mut self, err: ExtractionError) {
        self.diagnostics.push(Diagnostic::from(&err));
        self.errors.push(err);
    }
}

/// Error counts for display: the total is preserved, messages are deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub total: usize,
    pub distinct_messages: Vec<String>,
}

/// Result of a whole batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub records: Vec<InvoiceRecord>,
    pub errors: Vec<ExtractionError>,
    pub verified: Vec<VerifiedChargedAmount>,
    pub diagnostics: Diagnostics,
    pub reconciliation: ReconciliationResult,
}

impl BatchReport {
    /// Fold document reports, in order, and reconcile the totals.
    pub fn from_documents(reports: impl IntoIterator<Item = DocumentReport>, tolerance: Decimal) -> Self {
        let mut records = Vec::new();
        let mut errors = Vec::new();
        let mut verified = Vec::new();
        let mut diagnostics = Diagnostics::new();

        for report in reports {
            records.extend(report.records);
            errors.extend(report.errors);
            verified.extend(report.verified);
            diagnostics.extend(report.diagnostics);
        }

        let reconciliation = reconcile(&records, &verified, tolerance);
        if reconciliation.mismatched {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                DiagnosticCode::ReconciliationMismatch,
                None,
                format!(
                    "calculated total {} differs from verified total {} by {}",
                    reconciliation.calculated_total, reconciliation.verified_total, reconciliation.difference
                ),
            ));
        }

        info!(
            records = records.len(),
            errors = errors.len(),
            mismatched = reconciliation.mismatched,
            "batch complete"
        );

        Self {
            records,
            errors,
            verified,
            diagnostics,
            reconciliation,
        }
    }

    pub fn error_summary(&self) -> ErrorSummary {
        let distinct: BTreeSet<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        ErrorSummary {
            total: self.errors.len(),
            distinct_messages: distinct.into_iter().map(str::to_string).collect(),
        }
    }
}

/// The extraction engine: parser, segmenter and verifier configured together.
#[derive(Debug, Clone)]
pub struct Engine {
    parser: BillParser,
    segmenter: Segmenter,
    verifier: DuplicateValueVerifier,
    tolerance: Decimal,
}

impl Engine {
    /// Build an engine from configuration, compiling the template layout.
    pub fn from_config(config: &BillrecConfig) -> Result<Self> {
        let extraction = &config.extraction;
        if extraction.reconciliation_tolerance.is_sign_negative() {
            return Err(BillrecError::Config(format!(
                "extraction.reconciliation_tolerance must not be negative, got {}",
                extraction.reconciliation_tolerance
            )));
        }
        if extraction.verify_window_chars == 0 {
            return Err(BillrecError::Config(
                "extraction.verify_window_chars must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            parser: BillParser::with_layout(&config.layout)?
                .with_tolerance(extraction.reconciliation_tolerance),
            segmenter: Segmenter::new().with_first_page_skip(extraction.skip_marker_less_first_page),
            verifier: DuplicateValueVerifier::new().with_window(extraction.verify_window_chars),
            tolerance: extraction.reconciliation_tolerance,
        })
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn verifier(&self) -> &DuplicateValueVerifier {
        &self.verifier
    }

    /// Process one document from the page text provider's output.
    pub fn process_document(
        &self,
        document: &str,
        pages: std::result::Result<Vec<String>, PdfError>,
        directory: &dyn AccountDirectory,
    ) -> DocumentReport {
        let mut report = DocumentReport::new(document);

        let pages = match pages {
            Ok(pages) => pages,
            Err(PdfError::NoPages) => {
                report.push_error(ExtractionError::empty_document(SourceLocation::document(document)));
                return report;
            }
            Err(e) => {
                report.push_error(ExtractionError::unreadable_document(
                    SourceLocation::document(document),
                    e,
                ));
                return report;
            }
        };

        if pages.iter().all(|p| p.trim().is_empty()) {
            report.push_error(ExtractionError::empty_document(SourceLocation::document(document)));
            return report;
        }

        let verified = self.verifier.verify(document, &pages[0]);
        if let Some(reason) = verified.inconclusive_reason() {
            report.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::DuplicateCheckInconclusive,
                SourceLocation::page(document, 0),
                reason,
            ));
        }
        report.verified = Some(verified);

        for (page_index, page_text) in pages.iter().enumerate() {
            if page_text.trim().is_empty() {
                report.diagnostics.push(Diagnostic::info(
                    DiagnosticCode::BlankPage,
                    SourceLocation::page(document, page_index),
                    "page has no extractable text",
                ));
                continue;
            }

            for block in self.segmenter.segment(page_text, document, page_index) {
                let outcome = self.parser.parse_block(&block, directory);
                report.diagnostics.extend(outcome.diagnostics);

                match outcome.result {
                    Some(Ok(record)) => report.records.push(record),
                    Some(Err(err)) => report.errors.push(err),
                    None if block.whole_page => {
                        report.push_error(ExtractionError::no_account_marker(block.location()));
                    }
                    None => {}
                }
            }
        }

        if report.records.is_empty() && report.errors.is_empty() {
            report.push_error(ExtractionError::no_account_marker(SourceLocation::document(document)));
        }

        info!(
            document,
            records = report.records.len(),
            errors = report.errors.len(),
            "document processed"
        );
        report
    }

    /// Process documents sequentially and fold them into a batch report.
    pub fn run_batch<I>(&self, documents: I, directory: &dyn AccountDirectory) -> BatchReport
    where
        I: IntoIterator<Item = (String, std::result::Result<Vec<String>, PdfError>)>,
    {
        let reports = documents
            .into_iter()
            .map(|(name, pages)| self.process_document(&name, pages, directory));
        BatchReport::from_documents(reports, self.tolerance)
    }
}
