//! Amount parsing for Brazilian-formatted values ("1.010,13").

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{HORIZONTAL_SPACE, MONEY_TOKEN};
use super::{ExtractionMatch, FieldExtractor};

/// Parse a locale-formatted amount, returning `0.00` for anything malformed.
///
/// A missing optional field is a normal outcome, so malformed input is not an
/// error here. Use [`parse_amount_opt`] where the caller must tell "absent" from
/// "present and zero".
pub fn parse_amount(s: &str) -> Decimal {
    parse_amount_opt(s).unwrap_or(Decimal::ZERO)
}

/// Largest number of integer digits accepted in an amount.
///
/// Keeps every sum of parsed amounts far below `Decimal::MAX`, so totals never overflow.
pub const MAX_INTEGER_DIGITS: usize = 15;

/// Parse a locale-formatted amount: `.` groups thousands, `,` separates decimals.
///
/// Values with more than [`MAX_INTEGER_DIGITS`] integer digits are rejected.
pub fn parse_amount_opt(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_prefix("R$")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let well_formed = digits.starts_with(|c: char| c.is_ascii_digit())
        && digits.ends_with(|c: char| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
        && digits.matches(',').count() <= 1;
    if !well_formed {
        return None;
    }

    let integer_digits = digits
        .split(',')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|c| *c == '0')
        .count();
    if integer_digits > MAX_INTEGER_DIGITS {
        return None;
    }

    let normalized = digits.replace('.', "").replace(',', ".");
    let value = Decimal::from_str(&normalized).ok()?;

    Some(if negative { -value } else { value })
}

/// Format amount in Brazilian style (1.234,56).
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.round_dp(2));
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = unsigned.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

/// Collapse runs of horizontal whitespace into one space, keeping line breaks.
pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
    HORIZONTAL_SPACE.replace_all(text, " ")
}

/// Money token extractor: finds values such as `1.234,56` that are not glued
/// to a neighbouring digit or separator.
///
/// The match keeps the exact literal text, which the duplicate-value check relies on.
pub struct MoneyTokenExtractor;

impl MoneyTokenExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MoneyTokenExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MoneyTokenExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for m in MONEY_TOKEN.find_iter(text) {
            let glued_before = text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == ',');
            let glued_after = text[m.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit());
            if glued_before || glued_after {
                continue;
            }

            if let Some(amount) = parse_amount_opt(m.as_str()) {
                results.push(
                    ExtractionMatch::new(amount, "money-token", m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        }

        results
    }
}
