//! Batch reconciliation of calculated and verified totals.

use rust_decimal::Decimal;

use crate::models::record::InvoiceRecord;
use crate::models::report::{ReconciliationResult, VerifiedChargedAmount};

/// Default tolerance absorbing rounding differences (half a cent).
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Compare the sum of net amounts with the sum of confirmed charged amounts.
///
/// Unconfirmed documents are excluded from the verified total and listed in the
/// result. Sums are order independent.
pub fn reconcile(
    records: &[InvoiceRecord],
    verified: &[VerifiedChargedAmount],
    tolerance: Decimal,
) -> ReconciliationResult {
    let calculated_total: Decimal = records.iter().map(|r| r.net_amount).sum();
    let verified_total: Decimal = verified
        .iter()
        .filter(|v| v.duplicate_confirmed)
        .filter_map(|v| v.amount)
        .sum();
    let unconfirmed_documents = verified
        .iter()
        .filter(|v| !v.duplicate_confirmed)
        .map(|v| v.source_document.clone())
        .collect();

    let difference = calculated_total - verified_total;

    ReconciliationResult {
        calculated_total,
        verified_total,
        difference,
        mismatched: difference.abs() > tolerance,
        unconfirmed_documents,
    }
}
