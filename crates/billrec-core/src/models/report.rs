//! Per-document verification and batch reconciliation results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Charged amount of one document, checked against its second printed occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedChargedAmount {
    /// Document name.
    pub source_document: String,
    /// Parsed amount; only present when the duplicate was confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// True when the literal value occurs at least twice on the first page.
    pub duplicate_confirmed: bool,
    /// Whether the "Valor Cobrado" label was found at all.
    pub label_found: bool,
    /// Exact text of the value found after the label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    /// Number of literal occurrences on the first page.
    pub occurrences: usize,
}

impl VerifiedChargedAmount {
    /// Unconfirmed result for a document whose first page could not be checked.
    pub fn unavailable(source_document: impl Into<String>) -> Self {
        Self {
            source_document: source_document.into(),
            amount: None,
            duplicate_confirmed: false,
            label_found: false,
            literal: None,
            occurrences: 0,
        }
    }

    /// Short reason for an unconfirmed result.
    pub fn inconclusive_reason(&self) -> Option<String> {
        if self.duplicate_confirmed {
            return None;
        }
        let reason = match (&self.literal, self.label_found) {
            (_, false) => "charged amount label not found on the first page".to_string(),
            (None, true) => "no value follows the charged amount label".to_string(),
            (Some(literal), true) => format!(
                "charged amount {} printed {} time(s), expected at least 2",
                literal, self.occurrences
            ),
        };
        Some(reason)
    }
}

/// Batch-level comparison of calculated and verified totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Sum of the net amount of every record.
    pub calculated_total: Decimal,
    /// Sum of every confirmed charged amount.
    pub verified_total: Decimal,
    /// `calculated_total - verified_total`.
    pub difference: Decimal,
    /// True when the absolute difference exceeds the tolerance.
    pub mismatched: bool,
    /// Documents excluded from the verified total.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unconfirmed_documents: Vec<String>,
}
