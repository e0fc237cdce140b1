//! Duplicate-value verification of the charged amount on a document's first page.
//!
//! A correctly rendered first page prints the charged amount twice: once in the
//! summary box and once in the confirmation line. Finding it only once means text
//! extraction lost or misaligned part of the page.

use tracing::debug;

use crate::invoice::rules::{patterns::CHARGED_AMOUNT_LABEL, FieldExtractor, MoneyTokenExtractor};
use crate::models::report::VerifiedChargedAmount;

/// Verifies the charged amount of a document.
#[derive(Debug, Clone)]
pub struct DuplicateValueVerifier {
    /// Characters after the label scanned for the value.
    window_chars: usize,
}

impl DuplicateValueVerifier {
    pub fn new() -> Self {
        Self { window_chars: 200 }
    }

    /// Set the size of the window scanned after the label.
    pub fn with_window(mut self, window_chars: usize) -> Self {
        self.window_chars = window_chars;
        self
    }

    /// Verify one document from the text of its first page.
    pub fn verify(&self, document: &str, first_page_text: &str) -> VerifiedChargedAmount {
        let mut result = VerifiedChargedAmount::unavailable(document);

        let Some(label) = CHARGED_AMOUNT_LABEL.find(first_page_text) else {
            debug!(document, "charged amount label not found");
            return result;
        };
        result.label_found = true;

        let after = &first_page_text[label.end()..];
        let window_end = after
            .char_indices()
            .nth(self.window_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(after.len());
        let window = &after[..window_end];

        // A token cut off by the window edge is not a valid value
        let Some(token) = MoneyTokenExtractor::new()
            .extract_all(window)
            .into_iter()
            .find(|m| {
                m.position
                    .is_some_and(|(_, end)| !after[end..].starts_with(|c: char| c.is_ascii_digit()))
            })
        else {
            debug!(document, "no value after charged amount label");
            return result;
        };

        let occurrences = first_page_text.matches(token.source.as_str()).count();
        result.duplicate_confirmed = occurrences >= 2;
        if result.duplicate_confirmed {
            result.amount = Some(token.value);
        }
        result.occurrences = occurrences;
        result.literal = Some(token.source);

        debug!(
            document,
            literal = result.literal.as_deref().unwrap_or_default(),
            occurrences,
            "charged amount verification"
        );
        result
    }
}

impl Default for DuplicateValueVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify with default settings.
pub fn verify(document: &str, first_page_text: &str) -> VerifiedChargedAmount {
    DuplicateValueVerifier::new().verify(document, first_page_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_single_occurrence_is_unconfirmed() {
        let page = "Resumo\nValor Cobrado (R$) ... 1.234,56\nVencimento 10/05/2024";
        let result = verify("a.pdf", page);

        assert!(!result.duplicate_confirmed);
        assert_eq!(result.amount, None);
        assert_eq!(result.literal.as_deref(), Some("1.234,56"));
        assert_eq!(result.occurrences, 1);
    }

    #[test]
    fn test_duplicate_confirms_amount() {
        let page = "Valor Cobrado (R$) ... 1.234,56\nConfirmação: débito de 1.234,56 em conta";
        let result = verify("a.pdf", page);

        assert!(result.duplicate_confirmed);
        assert_eq!(result.amount, Some(Decimal::from_str("1234.56").unwrap()));
        assert_eq!(result.occurrences, 2);
    }

    #[test]
    fn test_label_missing() {
        let result = verify("a.pdf", "Total 1.234,56 e 1.234,56");

        assert!(!result.label_found);
        assert!(!result.duplicate_confirmed);
        assert!(result.inconclusive_reason().unwrap().contains("label"));
    }

    #[test]
    fn test_value_outside_window_is_ignored() {
        let filler = "x".repeat(300);
        let page = format!("Valor Cobrado (R$) {} 1.234,56 1.234,56", filler);
        let result = verify("a.pdf", &page);

        assert!(result.label_found);
        assert_eq!(result.literal, None);
        assert!(!result.duplicate_confirmed);
    }

    #[test]
    fn test_literal_formatting_must_match() {
        // Same value, different formatting: not a duplicate
        let page = "Valor Cobrado (R$) 1.234,56\nTotal 1234,56";
        let result = verify("a.pdf", page);

        assert!(!result.duplicate_confirmed);
        assert_eq!(result.occurrences, 1);
    }

    #[test]
    fn test_window_counts_characters_not_bytes() {
        let page = "Valor Cobrado ção 50,00 fim 50,00";
        let result = DuplicateValueVerifier::new().with_window(10).verify("a.pdf", page);

        assert!(result.duplicate_confirmed);
        assert_eq!(result.literal.as_deref(), Some("50,00"));
    }
}
