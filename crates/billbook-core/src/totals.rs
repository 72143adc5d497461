//! # Totals Calculator
//!
//! Turns line items and a flat discount into invoice totals.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each item:                                                         │
//! │      amount = qty × price            (rounded to the minor unit)        │
//! │      tax    = amount × tax%          (integer bps, half away from zero) │
//! │                                                                         │
//! │  subTotal = Σ amount                                                    │
//! │  taxTotal = Σ tax                                                       │
//! │  total    = max(0, subTotal + taxTotal − discount)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is computed per line and summed, never on the subtotal, so mixed-rate
//! invoices match what the customer sees on each row.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::LineItem;

/// Derived totals of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub sub_total: Money,
    pub tax_total: Money,
    /// Never negative: a discount larger than the bill floors it at zero.
    pub total: Money,
}

/// Computes invoice totals. Pure, deterministic, never fails.
///
/// ## Example
/// ```rust
/// use billbook_core::money::Money;
/// use billbook_core::totals::compute_totals;
/// use billbook_core::types::{LineItem, TaxRate};
///
/// let items = vec![
///     LineItem::new("Tea", 1.0, Money::from_minor(5_000), TaxRate::zero()),
///     LineItem::new("Cups", 3.0, Money::from_minor(1_000), TaxRate::from_percentage(10.0)),
/// ];
/// let totals = compute_totals(&items, Money::from_minor(2_000));
///
/// assert_eq!(totals.sub_total.minor(), 8_000);
/// assert_eq!(totals.tax_total.minor(), 300);
/// assert_eq!(totals.total.minor(), 6_300);
/// ```
pub fn compute_totals(items: &[LineItem], discount: Money) -> InvoiceTotals {
    let (sub_total, tax_total) = items
        .iter()
        .fold((Money::zero(), Money::zero()), |(sub, tax), item| {
            (sub + item.amount(), tax + item.tax())
        });

    InvoiceTotals {
        sub_total,
        tax_total,
        total: (sub_total + tax_total - discount).clamp_non_negative(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;

    fn item(qty: f64, price_major: i64, tax_pct: f64) -> LineItem {
        LineItem::new(
            "item",
            qty,
            Money::from_major_minor(price_major, 0),
            TaxRate::from_percentage(tax_pct),
        )
    }

    #[test]
    fn test_single_item_with_tax() {
        let totals = compute_totals(&[item(2.0, 100, 18.0)], Money::zero());
        assert_eq!(totals.sub_total, Money::from_major_minor(200, 0));
        assert_eq!(totals.tax_total, Money::from_major_minor(36, 0));
        assert_eq!(totals.total, Money::from_major_minor(236, 0));
    }

    #[test]
    fn test_mixed_rates_with_discount() {
        let items = [item(1.0, 50, 0.0), item(3.0, 10, 10.0)];
        let totals = compute_totals(&items, Money::from_major_minor(20, 0));
        assert_eq!(totals.sub_total, Money::from_major_minor(80, 0));
        assert_eq!(totals.tax_total, Money::from_major_minor(3, 0));
        assert_eq!(totals.total, Money::from_major_minor(63, 0));
    }

    #[test]
    fn test_total_never_negative() {
        let items = [item(1.0, 10, 5.0)];
        for discount in [0, 1_049, 1_050, 1_051, 1_000_000] {
            let totals = compute_totals(&items, Money::from_minor(discount));
            assert!(!totals.total.is_negative(), "discount {discount}");
        }
        let totals = compute_totals(&items, Money::from_minor(1_000_000));
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_empty_items() {
        let totals = compute_totals(&[], Money::zero());
        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn test_fractional_quantity() {
        // 2.5 kg at 40.00 = 100.00, 5% tax = 5.00
        let totals = compute_totals(&[item(2.5, 40, 5.0)], Money::zero());
        assert_eq!(totals.sub_total.minor(), 10_000);
        assert_eq!(totals.tax_total.minor(), 500);
    }
}
