//! Derived totals computed from the net total and the named line items.

use rust_decimal::Decimal;

use crate::models::record::{ItemCategory, LineItemValue};

/// Totals derived for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub gross_amount: Decimal,
    pub retained_tax_amount: Decimal,
    pub energy_amount: Decimal,
    pub cosip_amount: Decimal,
}

fn sum_category(line_items: &[LineItemValue], category: ItemCategory) -> Decimal {
    line_items
        .iter()
        .filter(|item| item.category == category)
        .map(LineItemValue::amount)
        .sum()
}

/// Derive gross, retained tax, energy and COSIP amounts.
///
/// `retained = |Σ withheld|`, `gross = net + retained`, `energy = gross - cosip`.
/// An upstream miss (net defaulted to zero) propagates arithmetically.
pub fn aggregate(net_total: Decimal, line_items: &[LineItemValue]) -> Totals {
    let retained_tax_amount = sum_category(line_items, ItemCategory::WithheldTax).abs();
    let cosip_amount = sum_category(line_items, ItemCategory::Surcharge);
    let gross_amount = net_total + retained_tax_amount;

    Totals {
        gross_amount,
        retained_tax_amount,
        energy_amount: gross_amount - cosip_amount,
        cosip_amount,
    }
}

/// Compare the energy items plus COSIP with the derived gross amount.
///
/// Returns `(items_total, difference)` when at least one energy item was read and
/// the difference exceeds `tolerance`.
pub fn line_item_disagreement(
    totals: &Totals,
    line_items: &[LineItemValue],
    tolerance: Decimal,
) -> Option<(Decimal, Decimal)> {
    let any_energy = line_items
        .iter()
        .any(|item| item.category == ItemCategory::Energy && item.value.is_some());
    if !any_energy {
        return None;
    }

    let items_total = sum_category(line_items, ItemCategory::Energy) + totals.cosip_amount;
    let difference = items_total - totals.gross_amount;
    (difference.abs() > tolerance).then_some((items_total, difference))
}
