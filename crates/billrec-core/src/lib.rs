//! Core library for utility bill extraction and reconciliation.
//!
//! This crate provides:
//! - PDF page text extraction (lopdf, pdf-extract)
//! - Page segmentation into one block per billed account
//! - Rule-based field extraction driven by a configurable template layout
//! - Derived totals, duplicate-value verification and batch reconciliation
//! - Typed errors and structured diagnostics for every stage

pub mod directory;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod pipeline;
pub mod reconcile;

pub use directory::AccountDirectory;
pub use error::{BillrecError, ExtractionError, ExtractionErrorKind, Result};
pub use invoice::{BillParser, BlockParser, Segmenter, TemplateLayout};
pub use models::{
    AccountBlock, AccountInfo, BillrecConfig, Diagnostic, DiagnosticCode, Diagnostics, InvoiceRecord,
    ReconciliationResult, Severity, SourceLocation, VerifiedChargedAmount,
};
pub use pdf::{PageSource, PdfExtractor, PdfProcessor};
pub use pipeline::{BatchReport, DocumentReport, Engine, ErrorSummary};
pub use reconcile::{reconcile, DuplicateValueVerifier};
