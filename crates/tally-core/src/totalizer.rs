//! # Invoice Totalizer
//!
//! Aggregates priced lines, layers the bill discount and rounds the amount
//! due. This is the only place the pipeline rounds.
//!
//! ## Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Σ gross ─ Σ offer ─ Σ item discount      = after item discounts       │
//! │  after item discounts × bill%             = bill discount              │
//! │  after item discounts ─ bill discount     = amount due (exact)         │
//! │  amount due, settled                      = pre-round total            │
//! │  amount due, round_to(step)               = rounded total              │
//! │  rounded ─ pre-round                      = round-off (signed)         │
//! │                                                                         │
//! │  199.60 → 200.00, round-off +0.40                                       │
//! │  928.08 → 928.00, round-off −0.08                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rounding decision is made on the exact amount due, never on the
//! settled figure: 100.4984 rounds to 100 even though it displays as
//! 100.50. The round-off is always reported on its own line; it is never
//! folded into a discount.

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percent, RoundingRule};
use crate::types::{InvoiceTotals, LineResult};
use crate::validation::validate_percent;

/// Builds the invoice totals from priced lines.
///
/// ## Errors
/// - [`CoreError::EmptyCart`] when there are no lines or the gross
///   subtotal is not positive
/// - [`CoreError::InvalidPercent`] when the bill discount exceeds 100%
pub fn totalize(
    lines: &[LineResult],
    bill_discount: Percent,
    rounding: RoundingRule,
) -> CoreResult<InvoiceTotals> {
    validate_percent("bill discount", bill_discount)?;

    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let gross_subtotal: Money = lines.iter().map(|l| l.gross_amount).sum();
    if !gross_subtotal.is_positive() {
        return Err(CoreError::EmptyCart);
    }

    let offer_savings_total: Money = lines.iter().map(|l| l.offer_savings).sum();
    let item_discount_total: Money = lines.iter().map(|l| l.item_discount_amount).sum();

    let after_item_discounts = gross_subtotal - offer_savings_total - item_discount_total;
    let bill_discount_amount = after_item_discounts.percent_of(bill_discount);

    let amount_due = after_item_discounts - bill_discount_amount;
    let pre_round_total = amount_due.settle();
    let rounded_total = amount_due.round_to(rounding);
    let round_off = rounded_total - pre_round_total;

    let totals = InvoiceTotals {
        gross_subtotal: gross_subtotal.settle(),
        offer_savings_total: offer_savings_total.settle(),
        item_discount_total: item_discount_total.settle(),
        bill_discount,
        bill_discount_amount: bill_discount_amount.settle(),
        pre_round_total,
        rounded_total,
        round_off,
    };

    debug!(
        lines = lines.len(),
        gross = %totals.gross_subtotal,
        savings = %totals.total_savings(),
        pre_round = %totals.pre_round_total,
        total = %totals.rounded_total,
        round_off = %totals.round_off,
        "Invoice totalized"
    );

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::allocate;
    use crate::types::CartLine;
    use rust_decimal_macros::dec;

    fn lines_for(prices: &[(i64, u32)]) -> Vec<LineResult> {
        let cart: Vec<CartLine> = prices
            .iter()
            .enumerate()
            .map(|(i, &(minor, qty))| CartLine::new(format!("SKU-{}", i), Money::from_minor(minor), qty))
            .collect();
        let eligible = vec![false; cart.len()];
        allocate(&cart, Money::zero(), &eligible)
    }

    #[test]
    fn test_round_up_reconciles() {
        let lines = lines_for(&[(19_960, 1)]);
        let totals = totalize(&lines, Percent::zero(), RoundingRule::whole_unit()).unwrap();

        assert_eq!(totals.pre_round_total, Money::from_minor(19_960));
        assert_eq!(totals.rounded_total, Money::from_major(200));
        assert_eq!(totals.round_off, Money::from_minor(40));
        assert_eq!(totals.rounded_total - totals.round_off, totals.pre_round_total);
    }

    #[test]
    fn test_round_down_is_negative() {
        let lines = lines_for(&[(10_030, 1)]);
        let totals = totalize(&lines, Percent::zero(), RoundingRule::whole_unit()).unwrap();

        assert_eq!(totals.rounded_total, Money::from_major(100));
        assert_eq!(totals.round_off, Money::from_minor(-30));
    }

    #[test]
    fn test_midpoint_rounds_up() {
        let lines = lines_for(&[(10_050, 1)]);
        let totals = totalize(&lines, Percent::zero(), RoundingRule::whole_unit()).unwrap();

        assert_eq!(totals.rounded_total, Money::from_major(101));
        assert_eq!(totals.round_off, Money::from_minor(50));
    }

    #[test]
    fn test_rounds_exact_amount_not_settled_one() {
        // 150.74 less 33.33% is 100.498358: displays as 100.50, pays 100
        let cart = vec![CartLine::new("TEA-250", Money::from_minor(15_074), 1)
            .with_discount(Percent::from_bps(3_333))];
        let lines = allocate(&cart, Money::zero(), &[false]);
        let totals = totalize(&lines, Percent::zero(), RoundingRule::whole_unit()).unwrap();

        assert_eq!(totals.pre_round_total, Money::from_minor(10_050));
        assert_eq!(totals.rounded_total, Money::from_major(100));
        assert_eq!(totals.round_off, Money::from_minor(-50));
        assert_eq!(totals.rounded_total - totals.round_off, totals.pre_round_total);
    }

    #[test]
    fn test_sub_minor_amount_below_midpoint_rounds_down() {
        let cart = vec![CartLine::new("TEA-250", Money::from_decimal(dec!(100.495)), 1)];
        let lines = allocate(&cart, Money::zero(), &[false]);
        let totals = totalize(&lines, Percent::zero(), RoundingRule::whole_unit()).unwrap();

        assert_eq!(totals.pre_round_total, Money::from_minor(10_050));
        assert_eq!(totals.rounded_total, Money::from_major(100));
        assert_eq!(totals.round_off, Money::from_minor(-50));
    }

    #[test]
    fn test_bill_discount_layers_last() {
        let lines = lines_for(&[(100_000, 1)]);
        let totals =
            totalize(&lines, Percent::from_whole(5), RoundingRule::whole_unit()).unwrap();

        assert_eq!(totals.bill_discount_amount, Money::from_major(50));
        assert_eq!(totals.pre_round_total, Money::from_major(950));
        assert!(totals.round_off.is_zero());
        assert_eq!(totals.total_savings(), Money::from_major(50));
    }

    #[test]
    fn test_minor_unit_rounding_has_no_round_off() {
        let lines = lines_for(&[(19_960, 1)]);
        let totals = totalize(&lines, Percent::zero(), RoundingRule::minor_unit()).unwrap();

        assert_eq!(totals.rounded_total, Money::from_minor(19_960));
        assert!(totals.round_off.is_zero());
    }

    #[test]
    fn test_empty_lines_rejected() {
        let result = totalize(&[], Percent::zero(), RoundingRule::whole_unit());
        assert!(matches!(result, Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_zero_gross_rejected() {
        let lines = lines_for(&[(0, 3)]);
        let result = totalize(&lines, Percent::zero(), RoundingRule::whole_unit());
        assert!(matches!(result, Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_bill_discount_over_100_rejected() {
        let lines = lines_for(&[(1_000, 1)]);
        let result = totalize(&lines, Percent::from_bps(10_001), RoundingRule::whole_unit());
        assert!(matches!(result, Err(CoreError::InvalidPercent { .. })));
    }

    #[test]
    fn test_full_bill_discount_is_zero_total() {
        let lines = lines_for(&[(1_000, 1)]);
        let totals =
            totalize(&lines, Percent::from_whole(100), RoundingRule::whole_unit()).unwrap();

        assert!(totals.pre_round_total.is_zero());
        assert!(totals.rounded_total.is_zero());
        assert!(totals.round_off.is_zero());
    }
}
