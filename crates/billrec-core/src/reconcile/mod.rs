//! Cross-checks of extracted totals against independently printed values.

mod duplicate;
mod totals;

pub use duplicate::{verify, DuplicateValueVerifier};
pub use totals::{reconcile, DEFAULT_TOLERANCE};
