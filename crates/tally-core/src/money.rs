//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! `Percent` rate and the `RoundingRule` used to settle an invoice.
//!
//! ## Why Exact Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  parseFloat("0.1") + parseFloat("0.2") = 0.30000000000000004  ❌        │
//! │                                                                         │
//! │  THE EARLY ROUNDING PROBLEM                                             │
//! │    300.00 of savings split 1000 : 300                                   │
//! │    → 230.77 + 69.23, then discounts on the rounded shares,              │
//! │      and the invoice drifts by a paisa per rounding step                │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal, rounded once                            │
//! │    Every step keeps full precision. The totalizer settles the           │
//! │    invoice to minor units and rounds the grand total exactly once.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::{Money, Percent};
//!
//! let price = Money::from_minor(29_999); // 299.99
//! let line = price.multiply_quantity(2); // 599.98
//! let off = line.percent_of(Percent::from_whole(10));
//! assert_eq!(off.settle(), Money::from_minor(6_000));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Decimal places of the smallest currency unit (paise, cents).
pub const MINOR_UNIT_PLACES: u32 = 2;

/// Basis points in 100%.
pub const FULL_BPS: u32 = 10_000;

/// Half-up: 0.5 goes away from zero.
const HALF_UP: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount held as an exact base-10 decimal.
///
/// ## Design Decisions
/// - **Decimal, not f64**: no binary drift on currency math
/// - **Unrounded until settled**: proportional shares keep their full
///   precision so that line figures still add up to the pooled saving
/// - **Serializes as a string**: JSON never carries a float amount
///
/// ## Where Money Flows
/// ```text
/// CartLine.unit_price ──► gross ──► offer share ──► item discount ──► net
///                                                                     │
/// InvoiceTotals ◄── settle() ◄── bill discount ◄── Σ net ◄────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Creates Money from minor units (paise, cents).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MINOR_UNIT_PLACES))
    }

    /// Creates Money from whole currency units.
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact (possibly unsettled) amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Strictly less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let line = Money::from_minor(299).multiply_quantity(3);
    /// assert_eq!(line, Money::from_minor(897));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns `rate` of this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::{Money, Percent};
    ///
    /// let amount = Money::from_major(230);
    /// let off = amount.percent_of(Percent::from_whole(10));
    /// assert_eq!(off, Money::from_major(23));
    /// ```
    #[inline]
    pub fn percent_of(&self, rate: Percent) -> Self {
        Money(self.0 * rate.fraction())
    }

    /// Returns the share of this pool that `part` earns out of `whole`.
    ///
    /// `pool × part / whole`, multiplied first so the quotient carries the
    /// most precision. A zero `whole` yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let pool = Money::from_major(300);
    /// let share = pool.share_of(Money::from_major(1000), Money::from_major(1300));
    /// assert_eq!(share.settle(), Money::from_minor(23_077));
    /// ```
    pub fn share_of(&self, part: Money, whole: Money) -> Self {
        if whole.is_zero() {
            return Money::zero();
        }
        Money(self.0 * part.0 / whole.0)
    }

    /// Rounds half-up to minor units, always carrying two decimal places.
    #[inline]
    pub fn settle(&self) -> Self {
        let mut settled = self.0.round_dp_with_strategy(MINOR_UNIT_PLACES, HALF_UP);
        settled.rescale(MINOR_UNIT_PLACES);
        Money(settled)
    }

    /// Rounds half-up to the nearest multiple of the rule's step.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::{Money, RoundingRule};
    ///
    /// let pre = Money::from_minor(19_960);
    /// assert_eq!(pre.round_to(RoundingRule::whole_unit()), Money::from_major(200));
    ///
    /// let nickel = RoundingRule::new(Money::from_minor(5));
    /// assert_eq!(Money::from_minor(1_012).round_to(nickel), Money::from_minor(1_010));
    /// ```
    pub fn round_to(&self, rule: RoundingRule) -> Self {
        let step = rule.step().0;
        if step <= Decimal::ZERO {
            return self.settle();
        }
        let steps = (self.0 / step).round_dp_with_strategy(0, HALF_UP);
        Money(steps * step).settle()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount settled to two decimal places, without a symbol.
///
/// ## Note
/// Currency symbols belong to the store configuration; see the CLI's
/// `StoreConfig::format_currency`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settled = self.settle().0;
        if settled.is_zero() {
            // Avoid printing "-0.00"
            return f.write_str("0.00");
        }
        write!(f, "{}", settled)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A discount rate in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 33.33% is exactly 3333 bps.
/// 1000 bps = 10%.
///
/// Rates above 100% are representable so that validation can reject them
/// with the offending value instead of silently clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a rate from a whole percentage (10 → 10%).
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percent(pct.saturating_mul(100))
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True when the rate lies in 0%..=100%.
    #[inline]
    pub const fn is_within_range(&self) -> bool {
        self.0 <= FULL_BPS
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The rate as an exact fraction: 1000 bps → 0.1000.
    #[inline]
    pub fn fraction(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pct = Decimal::new(i64::from(self.0), 2);
        pct = pct.normalize();
        write!(f, "{}%", pct)
    }
}

// =============================================================================
// Rounding Rule
// =============================================================================

/// How the grand total is rounded for payment.
///
/// ## Common Steps
/// ```text
/// step 1.00  → nearest whole rupee     199.60 → 200.00 (round-off +0.40)
/// step 0.05  → nearest nickel          10.12  → 10.10  (round-off -0.02)
/// step 0.01  → no visible round-off
/// ```
///
/// The same rule is used at checkout and when a receipt is re-projected, so
/// the two paths cannot disagree on a midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoundingRule {
    step: Money,
}

impl RoundingRule {
    /// Creates a rule with the given step. See
    /// [`validate_rounding_rule`](crate::validation::validate_rounding_rule).
    #[inline]
    pub const fn new(step: Money) -> Self {
        RoundingRule { step }
    }

    /// Round to the nearest whole currency unit.
    #[inline]
    pub fn whole_unit() -> Self {
        RoundingRule::new(Money::from_major(1))
    }

    /// Round to minor units only.
    #[inline]
    pub fn minor_unit() -> Self {
        RoundingRule::new(Money::from_minor(1))
    }

    #[inline]
    pub const fn step(&self) -> Money {
        self.step
    }
}

impl Default for RoundingRule {
    fn default() -> Self {
        RoundingRule::whole_unit()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_minor_and_major() {
        assert_eq!(Money::from_minor(1099).amount(), dec!(10.99));
        assert_eq!(Money::from_major(500).amount(), dec!(500));
        assert_eq!(Money::from_minor(50_000), Money::from_major(500));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "10.99");
        assert_eq!(Money::from_major(5).to_string(), "5.00");
        assert_eq!(Money::from_minor(-8).to_string(), "-0.08");
        assert_eq!(Money::zero().to_string(), "0.00");
        assert_eq!(Money::from_decimal(dec!(-0.001)).to_string(), "0.00");
        assert_eq!(Money::from_decimal(dec!(928.0769)).to_string(), "928.08");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(10);
        let b = Money::from_major(5);

        assert_eq!(a + b, Money::from_major(15));
        assert_eq!(a - b, Money::from_major(5));
        assert_eq!(-b, Money::from_major(-5));

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total, Money::from_major(20));
    }

    #[test]
    fn test_no_float_drift() {
        let mut total = Money::zero();
        for _ in 0..1000 {
            total += Money::from_minor(1);
        }
        assert_eq!(total, Money::from_major(10));
    }

    #[test]
    fn test_percent_of() {
        let amount = Money::from_decimal(dec!(230.7692307692307692307692308));
        let off = amount.percent_of(Percent::from_whole(10));
        assert_eq!(off.settle(), Money::from_minor(2_308));

        let odd = Money::from_major(100).percent_of(Percent::from_bps(3333));
        assert_eq!(odd, Money::from_decimal(dec!(33.33)));
    }

    #[test]
    fn test_share_of_splits_pool_by_revenue() {
        let pool = Money::from_major(300);
        let whole = Money::from_major(1300);
        let a = pool.share_of(Money::from_major(1000), whole);
        let b = pool.share_of(Money::from_major(300), whole);

        assert_eq!(a.settle(), Money::from_minor(23_077));
        assert_eq!(b.settle(), Money::from_minor(6_923));
        assert_eq!((a + b).settle(), pool);
    }

    #[test]
    fn test_share_of_zero_whole_is_zero() {
        let share = Money::from_major(300).share_of(Money::from_major(10), Money::zero());
        assert!(share.is_zero());
    }

    #[test]
    fn test_settle_is_half_up() {
        assert_eq!(Money::from_decimal(dec!(0.125)).settle(), Money::from_minor(13));
        assert_eq!(Money::from_decimal(dec!(0.135)).settle(), Money::from_minor(14));
        assert_eq!(Money::from_decimal(dec!(-0.125)).settle(), Money::from_minor(-13));
    }

    #[test]
    fn test_round_to_whole_unit() {
        let rule = RoundingRule::whole_unit();
        assert_eq!(Money::from_minor(19_960).round_to(rule), Money::from_major(200));
        assert_eq!(Money::from_minor(92_808).round_to(rule), Money::from_major(928));
        // Exact midpoint goes up
        assert_eq!(Money::from_minor(1_050).round_to(rule), Money::from_major(11));
    }

    #[test]
    fn test_round_to_fractional_step() {
        let nickel = RoundingRule::new(Money::from_minor(5));
        assert_eq!(Money::from_minor(1_012).round_to(nickel), Money::from_minor(1_010));
        assert_eq!(Money::from_minor(1_013).round_to(nickel), Money::from_minor(1_015));

        let none = RoundingRule::minor_unit();
        assert_eq!(Money::from_minor(1_013).round_to(none), Money::from_minor(1_013));
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(Percent::from_whole(10).bps(), 1000);
        assert!(Percent::from_whole(100).is_within_range());
        assert!(!Percent::from_bps(10_001).is_within_range());
        assert!(Percent::zero().is_zero());
        assert!((Percent::from_bps(825).percentage() - 8.25).abs() < 0.001);
        assert_eq!(Percent::from_bps(825).to_string(), "8.25%");
        assert_eq!(Percent::from_whole(5).to_string(), "5%");
    }

    #[test]
    fn test_money_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_minor(1099)).unwrap();
        assert_eq!(json, "\"10.99\"");

        let back: Money = serde_json::from_str("\"10.99\"").unwrap();
        assert_eq!(back, Money::from_minor(1099));
    }
}
