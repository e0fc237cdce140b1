//! Account identifier ("UC") extraction.

use super::patterns::ACCOUNT_MARKER;
use super::{ExtractionMatch, FieldExtractor};

/// Account identifier extractor.
///
/// Matches both surface forms of the marker, `UC: 12345` and
/// `Unidade Consumidora: 12345`. The match position starts at the label, which is
/// where the segmenter cuts blocks.
pub struct AccountIdExtractor;

impl AccountIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AccountIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AccountIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = ACCOUNT_MARKER.captures(text)?;
        let full_match = caps.get(0)?;
        Some(
            ExtractionMatch::new(caps[1].to_string(), "account-marker", full_match.as_str())
                .with_position(full_match.start(), full_match.end()),
        )
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ACCOUNT_MARKER
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                Some(
                    ExtractionMatch::new(caps[1].to_string(), "account-marker", full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Extract the first account id in the text.
pub fn extract_account_id(text: &str) -> Option<String> {
    AccountIdExtractor::new().extract(text).map(|m| m.value)
}
