//! Common regex patterns for utility bill extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Account marker: "UC: 12345" or "Unidade Consumidora: 12345"
    pub static ref ACCOUNT_MARKER: Regex = Regex::new(
        r"(?:UC:|Unidade Consumidora:)\s*(\d+)"
    ).unwrap();

    // Charged amount label printed in the first page summary box
    pub static ref CHARGED_AMOUNT_LABEL: Regex = Regex::new(
        r"(?i)Valor\s+Cobrado"
    ).unwrap();

    // Money token: 1.234,56 / 1234,56 / -24,78
    pub static ref MONEY_TOKEN: Regex = Regex::new(
        r"-?\d+(?:\.\d{3})*,\d{2}"
    ).unwrap();

    // Horizontal whitespace (line breaks excluded)
    pub static ref HORIZONTAL_SPACE: Regex = Regex::new(
        r"[^\S\n]+"
    ).unwrap();
}

/// Numeric token used by line item columns and net total rules.
pub const NUMBER_TOKEN: &str = r"-?\d(?:[\d.,]*\d)?";
