//! Data models shared by the extraction pipeline.

pub mod config;
pub mod diagnostic;
pub mod record;
pub mod report;

pub use config::BillrecConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use record::{AccountBlock, AccountInfo, InvoiceRecord, ItemCategory, LineItemValue, SourceLocation};
pub use report::{ReconciliationResult, VerifiedChargedAmount};
