//! Named line item extraction from the bill's charges table.
//!
//! Each row reads `NAME  quantity  rate  value`, e.g.
//!
//! ```text
//! Consumo TE                2.645   0,38190    1.010,13
//! Tributo Retido IRPJ       0       0,00000    -24,78
//! ```
//!
//! The value sits in a fixed numeric column after the name (the third one in the
//! current template). Rows may wrap, so any whitespace, line breaks included, may
//! separate the name from its columns. The name itself must start a line.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::amounts::parse_amount_opt;
use super::patterns::NUMBER_TOKEN;
use crate::error::LayoutError;
use crate::models::record::{ItemCategory, LineItemValue};

fn default_value_column() -> usize {
    3
}

/// Configured line item rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRule {
    /// Item name used in reports and diagnostics.
    pub name: String,
    /// Regex fragment matching the item label at the start of a row.
    pub label: String,
    /// How the item contributes to the totals.
    pub category: ItemCategory,
    /// 1-based numeric column after the label that holds the value.
    #[serde(default = "default_value_column")]
    pub value_column: usize,
}

impl LineItemRule {
    pub fn new(name: impl Into<String>, label: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            category,
            value_column: default_value_column(),
        }
    }

    /// Rules for the latest observed template.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Consumo TE", r"Consumo TE", ItemCategory::Energy),
            Self::new("Consumo TUSD", r"Consumo TUSD", ItemCategory::Energy),
            // The COSIP label carries free text (law reference, month) before the columns
            Self::new("COSIP Municipal", r"COSIP Municipal[^\n]*?", ItemCategory::Surcharge),
            Self::new("Tributo Retido IRPJ", r"Tributo Retido IRPJ", ItemCategory::WithheldTax),
            Self::new("Tributo Retido PIS", r"Tributo Retido PIS", ItemCategory::WithheldTax),
            Self::new("Tributo Retido COFINS", r"Tributo Retido COFINS", ItemCategory::WithheldTax),
            Self::new("Tributo Retido CSLL", r"Tributo Retido CSLL", ItemCategory::WithheldTax),
        ]
    }
}

/// Compiled line item rule.
#[derive(Debug, Clone)]
pub struct LineItemPattern {
    name: String,
    category: ItemCategory,
    pattern: Regex,
}

impl LineItemPattern {
    pub fn compile(rule: &LineItemRule) -> Result<Self, LayoutError> {
        if rule.value_column == 0 {
            return Err(LayoutError::InvalidColumn(rule.name.clone()));
        }

        let skipped = format!(r"(?:\s+{})", NUMBER_TOKEN).repeat(rule.value_column - 1);
        let source = format!(
            r"(?mi)^ ?(?:{}){}\s+(?P<value>{})",
            rule.label, skipped, NUMBER_TOKEN
        );
        let pattern = Regex::new(&source).map_err(|source| LayoutError::Pattern {
            rule: rule.name.clone(),
            source,
        })?;

        Ok(Self {
            name: rule.name.clone(),
            category: rule.category,
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ItemCategory {
        self.category
    }

    /// Value of this item in whitespace-normalized text, if its row is present.
    pub fn apply(&self, normalized: &str) -> Option<Decimal> {
        let caps = self.pattern.captures(normalized)?;
        parse_amount_opt(caps.name("value")?.as_str())
    }
}

/// Read every configured line item. Missing rows yield `value: None`.
pub fn extract_line_items(patterns: &[LineItemPattern], normalized: &str) -> Vec<LineItemValue> {
    patterns
        .iter()
        .map(|pattern| {
            let value = pattern.apply(normalized);
            trace!(item = pattern.name(), ?value, "line item");
            LineItemValue {
                name: pattern.name.clone(),
                category: pattern.category,
                value,
            }
        })
        .collect()
}
