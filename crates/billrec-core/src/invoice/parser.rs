//! Block parser: turns one account block into an invoice record or a typed error.

use rust_decimal::Decimal;
use tracing::debug;

use crate::directory::AccountDirectory;
use crate::error::{ExtractionError, LayoutError};
use crate::models::diagnostic::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::models::record::{AccountBlock, InvoiceRecord};
use crate::reconcile::DEFAULT_TOLERANCE;

use super::aggregate::{aggregate, line_item_disagreement};
use super::layout::{LayoutConfig, TemplateLayout};
use super::rules::{
    account::extract_account_id, amounts::format_amount, extract_line_items, extract_net_total,
    normalize_whitespace,
};

/// Result of parsing one block.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    /// `None` when the block carries no account id and is not a billing block.
    pub result: Option<Result<InvoiceRecord, ExtractionError>>,
    /// Non-fatal findings raised while parsing.
    pub diagnostics: Diagnostics,
}

/// Trait for account block parsing.
pub trait BlockParser {
    /// Parse a block against an account directory.
    fn parse_block(&self, block: &AccountBlock, directory: &dyn AccountDirectory) -> BlockOutcome;
}

/// Rule-based bill parser driven by a template layout.
#[derive(Debug, Clone)]
pub struct BillParser {
    layout: TemplateLayout,
    /// Tolerance for the line item cross-check.
    tolerance: Decimal,
}

impl BillParser {
    /// Create a parser with the default layout.
    pub fn new() -> Result<Self, LayoutError> {
        Self::with_layout(&LayoutConfig::default())
    }

    /// Create a parser for a configured layout.
    pub fn with_layout(config: &LayoutConfig) -> Result<Self, LayoutError> {
        Ok(Self {
            layout: TemplateLayout::compile(config)?,
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    /// Set the tolerance used by the line item cross-check.
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }
}

impl BlockParser for BillParser {
    fn parse_block(&self, block: &AccountBlock, directory: &dyn AccountDirectory) -> BlockOutcome {
        let mut diagnostics = Diagnostics::new();
        let location = block.location();

        let Some(account_id) = extract_account_id(&block.raw_text) else {
            debug!(%location, "block has no account id");
            return BlockOutcome {
                result: None,
                diagnostics,
            };
        };

        let Some(info) = directory.lookup(&account_id) else {
            let err = ExtractionError::unknown_account(account_id, location);
            diagnostics.push(Diagnostic::from(&err));
            return BlockOutcome {
                result: Some(Err(err)),
                diagnostics,
            };
        };

        let text = normalize_whitespace(&block.raw_text);

        let net_total = extract_net_total(self.layout.net_total(), &text);
        let (net_amount, net_total_rule) = match net_total {
            Some(found) => {
                debug!(%location, rule = %found.rule, value = %found.value, "net total");
                (found.value, Some(found.rule))
            }
            None => {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::NetTotalDefaulted,
                    location.clone(),
                    format!("net total not found for UC {}, using 0,00", account_id),
                ));
                (Decimal::ZERO, None)
            }
        };

        let line_items = extract_line_items(self.layout.line_items(), &text);
        for item in line_items.iter().filter(|item| item.value.is_none()) {
            diagnostics.push(Diagnostic::info(
                DiagnosticCode::LineItemDefaulted,
                location.clone(),
                format!("'{}' not found for UC {}, using 0,00", item.name, account_id),
            ));
        }

        let totals = aggregate(net_amount, &line_items);
        if let Some((items_total, difference)) =
            line_item_disagreement(&totals, &line_items, self.tolerance)
        {
            diagnostics.push(Diagnostic::info(
                DiagnosticCode::LineItemsDisagree,
                location.clone(),
                format!(
                    "UC {}: energy items plus COSIP add up to {} but gross is {} (difference {})",
                    account_id,
                    format_amount(items_total),
                    format_amount(totals.gross_amount),
                    format_amount(difference)
                ),
            ));
        }

        let record = InvoiceRecord {
            cost_center: info.cost_center.clone(),
            account_name: info.account_name.clone(),
            energy_amount: totals.energy_amount,
            cosip_amount: totals.cosip_amount,
            gross_amount: totals.gross_amount,
            retained_tax_amount: totals.retained_tax_amount,
            net_amount,
            source: location,
            net_total_rule,
            line_items,
            account_id,
        };

        BlockOutcome {
            result: Some(Ok(record)),
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionErrorKind;
    use crate::models::record::AccountInfo;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn directory() -> HashMap<String, AccountInfo> {
        let mut map = HashMap::new();
        map.insert(
            "12345".to_string(),
            AccountInfo {
                cost_center: "0101".to_string(),
                account_name: "Prefeitura - Sede".to_string(),
            },
        );
        map
    }

    fn block(text: &str) -> AccountBlock {
        AccountBlock {
            raw_text: text.to_string(),
            source_document: "fatura.pdf".to_string(),
            page_index: 1,
            whole_page: false,
        }
    }

    fn parse(text: &str) -> BlockOutcome {
        BillParser::new().unwrap().parse_block(&block(text), &directory())
    }

    #[test]
    fn test_default_tolerance() {
        assert_eq!(BillParser::new().unwrap().tolerance, DEFAULT_TOLERANCE);
    }

    const SCENARIO_A: &str = "UC: 12345\n\
        Grupo / Subgrupo Tensão: B3 / Comercial\n\
        Valor: R$ 1.010,13\n\
        Consumo TE   2.645   0,38190   1.010,13\n";

    #[test]
    fn test_energy_without_taxes() {
        let outcome = parse(SCENARIO_A);
        let record = outcome.result.unwrap().unwrap();

        assert_eq!(record.account_id, "12345");
        assert_eq!(record.cost_center, "0101");
        assert_eq!(record.account_name, "Prefeitura - Sede");
        assert_eq!(record.net_amount, dec("1010.13"));
        assert_eq!(record.energy_amount, dec("1010.13"));
        assert_eq!(record.retained_tax_amount, Decimal::ZERO);
        assert_eq!(record.net_total_rule.as_deref(), Some("rate-class"));
        assert_eq!(record.source.page, Some(2));
    }

    #[test]
    fn test_withheld_tax_adds_to_gross() {
        let text = format!("{}Tributo Retido IRPJ   0   0,00000   -24,78\n", SCENARIO_A);
        let record = parse(&text).result.unwrap().unwrap();

        assert_eq!(record.retained_tax_amount, dec("24.78"));
        assert_eq!(record.gross_amount, record.net_amount + dec("24.78"));
        assert_eq!(record.gross_amount, record.energy_amount + record.cosip_amount);
    }

    #[test]
    fn test_unknown_account() {
        let outcome = parse("UC: 99999\nValor: R$ 10,00");

        let err = outcome.result.unwrap().unwrap_err();
        assert_eq!(err.kind, ExtractionErrorKind::UnknownAccount);
        assert_eq!(err.account_id.as_deref(), Some("99999"));
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn test_no_account_id_is_absent() {
        let outcome = parse("Informações gerais sem identificação");
        assert!(outcome.result.is_none());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_net_total_still_produces_record() {
        let outcome = parse("UC: 12345\nConsumo TE 100 0,5 50,00");
        let record = outcome.result.unwrap().unwrap();

        assert_eq!(record.net_amount, Decimal::ZERO);
        assert!(!record.has_net_total());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::NetTotalDefaulted));
    }

    #[test]
    fn test_missing_items_are_informational() {
        let outcome = parse(SCENARIO_A);
        let defaulted = outcome
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::LineItemDefaulted)
            .count();

        // TUSD, COSIP and the four withheld taxes are absent
        assert_eq!(defaulted, 6);
        assert_eq!(outcome.diagnostics.count_at_least(crate::Severity::Warning), 0);
    }

    #[test]
    fn test_line_item_disagreement_reported() {
        let text = "UC: 12345\nValor: R$ 900,00\nConsumo TE 2.645 0,38190 1.010,13\n";
        let outcome = parse(text);

        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::LineItemsDisagree));
    }
}
