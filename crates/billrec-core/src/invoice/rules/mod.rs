//! Rule-based field extractors for utility bills.

pub mod account;
pub mod amounts;
pub mod line_items;
pub mod net_total;
pub mod patterns;

pub use account::AccountIdExtractor;
pub use amounts::{format_amount, normalize_whitespace, parse_amount, parse_amount_opt, MoneyTokenExtractor};
pub use line_items::{extract_line_items, LineItemPattern, LineItemRule};
pub use net_total::{extract_net_total, NetTotalRule, NetTotalStrategy};
pub use patterns::*;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value together with the rule and text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Name of the rule that produced the value.
    pub rule: String,
    /// Byte range of the match in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            value,
            rule: rule.into(),
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
