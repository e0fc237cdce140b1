//! Template layout: the pattern tables that describe one invoice template revision.
//!
//! Templates drift without any version marker in the text, so the layout is data.
//! The defaults describe the latest observed revision; older or newer revisions can
//! be described in the configuration file without code changes.

use serde::{Deserialize, Serialize};

use super::rules::{LineItemPattern, LineItemRule, NetTotalRule, NetTotalStrategy};
use crate::error::LayoutError;

/// Serializable layout description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Net total rules, tried in order.
    pub net_total_rules: Vec<NetTotalRule>,

    /// Named line items read from the charges table.
    pub line_items: Vec<LineItemRule>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            net_total_rules: NetTotalRule::defaults(),
            line_items: LineItemRule::defaults(),
        }
    }
}

/// Compiled layout, ready to be shared across threads.
#[derive(Debug, Clone)]
pub struct TemplateLayout {
    net_total: Vec<NetTotalStrategy>,
    line_items: Vec<LineItemPattern>,
}

impl TemplateLayout {
    /// Compile every rule of a layout description.
    pub fn compile(config: &LayoutConfig) -> Result<Self, LayoutError> {
        if config.net_total_rules.is_empty() {
            return Err(LayoutError::NoNetTotalRules);
        }

        let net_total = config
            .net_total_rules
            .iter()
            .map(NetTotalStrategy::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let line_items = config
            .line_items
            .iter()
            .map(LineItemPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            net_total,
            line_items,
        })
    }

    pub fn net_total(&self) -> &[NetTotalStrategy] {
        &self.net_total
    }

    pub fn line_items(&self) -> &[LineItemPattern] {
        &self.line_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::ItemCategory;

    #[test]
    fn test_default_layout_compiles() {
        let layout = TemplateLayout::compile(&LayoutConfig::default()).unwrap();
        let names: Vec<&str> = layout.net_total().iter().map(|s| s.name()).collect();

        assert_eq!(names, vec!["rate-class", "labeled-value", "total-payable"]);
        assert_eq!(layout.line_items().len(), 7);
        assert_eq!(
            layout
                .line_items()
                .iter()
                .filter(|p| p.category() == ItemCategory::WithheldTax)
                .count(),
            4
        );
    }

    #[test]
    fn test_invalid_pattern_names_rule() {
        let mut config = LayoutConfig::default();
        config.line_items.push(LineItemRule::new("broken", "(", ItemCategory::Energy));

        let err = TemplateLayout::compile(&config).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_empty_net_total_rules() {
        let config = LayoutConfig {
            net_total_rules: Vec::new(),
            ..LayoutConfig::default()
        };
        assert!(matches!(
            TemplateLayout::compile(&config),
            Err(LayoutError::NoNetTotalRules)
        ));
    }
}
