//! Account blocks and the invoice records extracted from them.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a record or failure came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Document name (usually the file name).
    pub document: String,
    /// Page number (1-indexed), absent for document-level entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl SourceLocation {
    /// Location of a whole document.
    pub fn document(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            page: None,
        }
    }

    /// Location of a page, from its zero-based index.
    pub fn page(document: impl Into<String>, page_index: usize) -> Self {
        Self {
            document: document.into(),
            page: Some(page_index as u32 + 1),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "{}, page {}", self.document, page),
            None => f.write_str(&self.document),
        }
    }
}

/// A contiguous span of page text believed to describe one billed account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBlock {
    /// Text of the block, starting at its account marker.
    pub raw_text: String,
    /// Document the page belongs to.
    pub source_document: String,
    /// Zero-based page index.
    pub page_index: usize,
    /// True when the page had no marker and the block spans the whole page.
    pub whole_page: bool,
}

impl AccountBlock {
    pub fn location(&self) -> SourceLocation {
        SourceLocation::page(self.source_document.clone(), self.page_index)
    }
}

/// Reference data for one account, supplied by the account directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Cost center code ("Cod de Reg").
    pub cost_center: String,
    /// Account holder name.
    pub account_name: String,
}

/// How a named line item contributes to the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Energy consumption charges (TE, TUSD).
    Energy,
    /// Municipal public lighting surcharge (COSIP).
    Surcharge,
    /// Tax withheld at source; printed as a negative amount.
    WithheldTax,
}

/// Value read for one named line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemValue {
    /// Item name, as configured in the layout.
    pub name: String,
    /// Item category.
    pub category: ItemCategory,
    /// Parsed value of the configured column, absent when the row was not found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
}

impl LineItemValue {
    /// Value used in arithmetic: a missing item counts as zero.
    pub fn amount(&self) -> Decimal {
        self.value.unwrap_or(Decimal::ZERO)
    }
}

/// Structured result for one account on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Account identifier ("UC").
    pub account_id: String,
    /// Cost center from the account directory.
    pub cost_center: String,
    /// Account name from the account directory.
    pub account_name: String,
    /// Gross amount minus the COSIP surcharge.
    pub energy_amount: Decimal,
    /// Municipal surcharge.
    pub cosip_amount: Decimal,
    /// Net amount plus retained taxes.
    pub gross_amount: Decimal,
    /// Magnitude of all withheld taxes.
    pub retained_tax_amount: Decimal,
    /// Printed payable total; zero when it could not be read.
    pub net_amount: Decimal,
    /// Document and page of the block.
    pub source: SourceLocation,
    /// Name of the net total rule that matched, absent when the net total defaulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_total_rule: Option<String>,
    /// Raw line item values behind the totals.
    #[serde(default)]
    pub line_items: Vec<LineItemValue>,
}

impl InvoiceRecord {
    /// Whether the net amount was actually read from the block.
    pub fn has_net_total(&self) -> bool {
        self.net_total_rule.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(SourceLocation::page("a.pdf", 2).to_string(), "a.pdf, page 3");
        assert_eq!(SourceLocation::document("a.pdf").to_string(), "a.pdf");
    }

    #[test]
    fn test_missing_item_counts_as_zero() {
        let item = LineItemValue {
            name: "Consumo TE".to_string(),
            category: ItemCategory::Energy,
            value: None,
        };
        assert_eq!(item.amount(), Decimal::ZERO);
    }
}
