//! # Promotion Bundler
//!
//! Computes the "buy N get 1 free" saving for the whole cart.
//!
//! ## Mix-and-Match Bundling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  buy1get1, eligible lines: 2 × 500, 1 × 300                            │
//! │                                                                         │
//! │  1. Expand to units           [500, 500, 300]                          │
//! │  2. Sort ascending            [300, 500, 500]                          │
//! │  3. free = 3 / 2 = 1          remainder = 3 % 2 = 1                    │
//! │  4. Saving = cheapest 1 unit  300                                      │
//! │                                                                         │
//! │  Units from different SKUs group together: the offer is store-wide.    │
//! │  The cheapest units are always the free ones.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::money::Money;
use crate::types::{CartLine, OfferStats, PromotionConfig};

/// The flat, ascending list of eligible unit prices for one invoice.
///
/// One entry per unit, not per line. Lives only for one pricing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferGroup {
    units: Vec<Money>,
}

impl OfferGroup {
    /// Expands every eligible line into its units and sorts them.
    ///
    /// `eligible[i]` says whether `lines[i]` participates.
    pub fn collect(lines: &[CartLine], eligible: &[bool]) -> Self {
        let capacity = lines
            .iter()
            .zip(eligible)
            .filter(|(_, &e)| e)
            .map(|(l, _)| l.quantity as usize)
            .sum();

        let mut units = Vec::with_capacity(capacity);
        for (line, _) in lines.iter().zip(eligible).filter(|(_, &e)| e) {
            units.extend(std::iter::repeat(line.unit_price).take(line.quantity as usize));
        }

        // Stable: equal prices keep cart order
        units.sort();

        OfferGroup { units }
    }

    /// Number of eligible units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit prices, cheapest first.
    #[inline]
    pub fn units(&self) -> &[Money] {
        &self.units
    }

    /// Sum of the `count` cheapest units.
    pub fn cheapest(&self, count: usize) -> Money {
        self.units.iter().take(count).sum()
    }
}

/// Pooled promotion saving and its group math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSavings {
    pub total: Money,
    pub stats: OfferStats,
}

impl GroupSavings {
    /// No promotion, no saving.
    pub const fn none() -> Self {
        GroupSavings {
            total: Money::zero(),
            stats: OfferStats::empty(),
        }
    }
}

/// Computes the group saving for the active tag across the whole cart.
///
/// ## Example
/// ```rust
/// use tally_core::bundler::compute_group_savings;
/// use tally_core::{CartLine, EligibilityMode, Money, PromotionConfig, PromotionTag};
///
/// let lines = vec![
///     CartLine::new("A", Money::from_major(100), 1),
///     CartLine::new("B", Money::from_major(150), 1),
///     CartLine::new("C", Money::from_major(200), 1),
///     CartLine::new("D", Money::from_major(300), 1),
/// ];
/// let config = PromotionConfig::new(PromotionTag::Buy1Get1, EligibilityMode::All);
///
/// let savings = compute_group_savings(&lines, &config, &[true; 4]);
/// assert_eq!(savings.stats.free_units, 2);
/// assert_eq!(savings.total, Money::from_major(250));
/// ```
pub fn compute_group_savings(
    lines: &[CartLine],
    config: &PromotionConfig,
    eligible: &[bool],
) -> GroupSavings {
    let Some(group_size) = config.tag.group_size() else {
        return GroupSavings::none();
    };

    let group = OfferGroup::collect(lines, eligible);
    let stats = OfferStats::for_units(group.len(), group_size);
    let total = group.cheapest(stats.free_units);

    trace!(
        tag = %config.tag,
        units = stats.total_units,
        free_units = stats.free_units,
        remainder = stats.remainder_units,
        savings = %total,
        "Bundled promotion units"
    );

    GroupSavings { total, stats }
}
