//! Net total extraction as an ordered chain of strategies.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::amounts::parse_amount_opt;
use super::patterns::NUMBER_TOKEN;
use super::ExtractionMatch;
use crate::error::LayoutError;

/// Configured net total rule. The first capture group of `pattern` holds the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetTotalRule {
    pub name: String,
    pub pattern: String,
}

impl NetTotalRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Rules for the latest observed template, most specific first.
    pub fn defaults() -> Vec<Self> {
        vec![
            // Rate-class declaration followed, possibly lines later, by the labeled value
            Self::new(
                "rate-class",
                format!(r"(?is)Grupo\s*/\s*Subgrupo\s+Tens[ãa]o:.*?Valor:\s*R\$\s*({})", NUMBER_TOKEN),
            ),
            Self::new("labeled-value", format!(r"(?i)Valor:\s*R\$\s*({})", NUMBER_TOKEN)),
            Self::new(
                "total-payable",
                format!(
                    r"(?i)Total\s+a\s+Pagar(?:\s*\(R\$\))?\s*:?\s*(?:R\$\s*)?({})",
                    NUMBER_TOKEN
                ),
            ),
        ]
    }
}

/// Compiled net total strategy.
#[derive(Debug, Clone)]
pub struct NetTotalStrategy {
    name: String,
    pattern: Regex,
}

impl NetTotalStrategy {
    pub fn compile(rule: &NetTotalRule) -> Result<Self, LayoutError> {
        let pattern = Regex::new(&rule.pattern).map_err(|source| LayoutError::Pattern {
            rule: rule.name.clone(),
            source,
        })?;
        if pattern.captures_len() < 2 {
            return Err(LayoutError::MissingCapture(rule.name.clone()));
        }

        Ok(Self {
            name: rule.name.clone(),
            pattern,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this strategy alone.
    pub fn apply(&self, text: &str) -> Option<ExtractionMatch<Decimal>> {
        let caps = self.pattern.captures(text)?;
        let value = caps.get(1)?;
        let amount = parse_amount_opt(value.as_str())?;
        Some(
            ExtractionMatch::new(amount, self.name.clone(), value.as_str())
                .with_position(value.start(), value.end()),
        )
    }
}

/// Try each strategy in order; the first one that yields a value wins.
pub fn extract_net_total(strategies: &[NetTotalStrategy], text: &str) -> Option<ExtractionMatch<Decimal>> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.apply(text);
        trace!(rule = strategy.name(), matched = found.is_some(), "net total strategy");
        found
    })
}
