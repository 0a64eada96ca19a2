//! # Discount Allocator
//!
//! Spreads the pooled promotion saving over the eligible lines by revenue
//! share, then layers each line's own percentage discount on top.
//!
//! ## Per-Line Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gross            = unit_price × quantity                              │
//! │  offer_savings    = pool × gross / eligible_gross    (eligible lines)  │
//! │                   = 0                                (everyone else)   │
//! │  price_after      = gross − offer_savings                              │
//! │  item_discount    = price_after × line_discount%                       │
//! │  net              = price_after − item_discount                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `eligible_gross` is computed once before the allocation pass. The free
//! units were picked cheapest-first across the whole cart, yet the saving is
//! shared by revenue: a high-priced line absorbs part of a cheap line's free
//! unit. Store-wide bundling works this way on purpose.

use tracing::{error, trace};

use crate::money::Money;
use crate::types::{CartLine, LineResult};

/// Allocates `group_savings` across `lines`.
///
/// `eligible[i]` says whether `lines[i]` participates; results are in cart
/// order.
///
/// ## Example
/// ```rust
/// use tally_core::allocator::allocate;
/// use tally_core::{CartLine, Money};
///
/// let lines = vec![
///     CartLine::new("A", Money::from_major(500), 2),
///     CartLine::new("B", Money::from_major(300), 1),
/// ];
/// let results = allocate(&lines, Money::from_major(300), &[true, true]);
///
/// assert_eq!(results[0].offer_savings.settle(), Money::from_minor(23_077));
/// assert_eq!(results[1].offer_savings.settle(), Money::from_minor(6_923));
/// ```
pub fn allocate(lines: &[CartLine], group_savings: Money, eligible: &[bool]) -> Vec<LineResult> {
    let eligible_gross: Money = lines
        .iter()
        .zip(eligible)
        .filter(|(_, &e)| e)
        .map(|(line, _)| line.gross_amount())
        .sum();

    let pool = if group_savings.is_positive() && eligible_gross.is_zero() {
        // Savings come from eligible units, so this cannot happen with
        // validated input. Never divide by zero.
        error!(
            savings = %group_savings,
            "Promotion savings with zero eligible gross; allocating nothing"
        );
        Money::zero()
    } else {
        group_savings
    };

    lines
        .iter()
        .zip(eligible)
        .map(|(line, &is_eligible)| {
            let gross_amount = line.gross_amount();
            let offer_savings = if is_eligible && pool.is_positive() {
                pool.share_of(gross_amount, eligible_gross)
            } else {
                Money::zero()
            };

            let result = price_line(line, is_eligible, gross_amount, offer_savings);
            trace!(
                sku = %result.sku_id,
                gross = %result.gross_amount,
                offer = %result.offer_savings,
                item_discount = %result.item_discount_amount,
                net = %result.net_amount,
                "Allocated line"
            );
            result
        })
        .collect()
}

/// Applies the line discount after a known offer share.
///
/// Shared with receipt projection, which supplies the persisted share.
pub(crate) fn price_line(
    line: &CartLine,
    eligible: bool,
    gross_amount: Money,
    offer_savings: Money,
) -> LineResult {
    let price_after_offer = gross_amount - offer_savings;
    let item_discount_amount = price_after_offer.percent_of(line.discount);
    let net_amount = price_after_offer - item_discount_amount;

    LineResult {
        sku_id: line.sku_id.clone(),
        unit_price: line.unit_price,
        quantity: line.quantity,
        eligible,
        gross_amount,
        offer_savings,
        discount: line.discount,
        item_discount_amount,
        net_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Percent;

    fn line(sku: &str, price: i64, qty: u32, disc: u32) -> CartLine {
        CartLine::new(sku, Money::from_major(price), qty).with_discount(Percent::from_whole(disc))
    }

    #[test]
    fn test_proportional_by_revenue_share() {
        let lines = vec![line("A", 500, 2, 0), line("B", 300, 1, 10)];
        let results = allocate(&lines, Money::from_major(300), &[true, true]);

        assert_eq!(results[0].gross_amount, Money::from_major(1000));
        assert_eq!(results[0].offer_savings.settle(), Money::from_minor(23_077));
        assert_eq!(results[0].net_amount.settle(), Money::from_minor(76_923));

        assert_eq!(results[1].offer_savings.settle(), Money::from_minor(6_923));
        assert_eq!(results[1].price_after_offer().settle(), Money::from_minor(23_077));
        assert_eq!(results[1].item_discount_amount.settle(), Money::from_minor(2_308));
        assert_eq!(results[1].net_amount.settle(), Money::from_minor(20_769));
    }

    #[test]
    fn test_shares_sum_to_pool() {
        let lines = vec![line("A", 333, 1, 0), line("B", 333, 1, 0), line("C", 333, 1, 0)];
        let pool = Money::from_major(333);
        let results = allocate(&lines, pool, &[true, true, true]);

        let allocated: Money = results.iter().map(|r| r.offer_savings).sum();
        assert_eq!(allocated.settle(), pool);
    }

    #[test]
    fn test_savings_never_exceed_gross() {
        let lines = vec![line("A", 1, 1, 0), line("B", 999, 1, 0), line("C", 7, 3, 50)];
        let results = allocate(&lines, Money::from_major(8), &[true, true, true]);

        for r in &results {
            assert!(!r.offer_savings.is_negative());
            assert!(r.offer_savings <= r.gross_amount);
        }
    }

    #[test]
    fn test_ineligible_line_gets_nothing() {
        let lines = vec![line("A", 500, 2, 0), line("B", 300, 1, 0)];
        let results = allocate(&lines, Money::from_major(500), &[true, false]);

        assert_eq!(results[0].offer_savings, Money::from_major(500));
        assert!(results[1].offer_savings.is_zero());
        assert!(!results[1].eligible);
        assert_eq!(results[1].net_amount, Money::from_major(300));
    }

    #[test]
    fn test_no_savings_only_line_discounts() {
        let lines = vec![line("A", 200, 1, 25)];
        let results = allocate(&lines, Money::zero(), &[true]);

        assert!(results[0].offer_savings.is_zero());
        assert_eq!(results[0].item_discount_amount, Money::from_major(50));
        assert_eq!(results[0].net_amount, Money::from_major(150));
    }

    #[test]
    fn test_zero_eligible_gross_guard() {
        // Free items only: eligible gross is zero while a saving is claimed
        let lines = vec![line("A", 0, 2, 0), line("B", 100, 1, 0)];
        let results = allocate(&lines, Money::from_major(10), &[true, false]);

        assert!(results.iter().all(|r| r.offer_savings.is_zero()));
        assert_eq!(results[1].net_amount, Money::from_major(100));
    }
}
