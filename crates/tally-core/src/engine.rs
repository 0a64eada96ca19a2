//! # Pricing Engine
//!
//! The single entry point for pricing a cart.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       price_invoice()                                   │
//! │                                                                         │
//! │  PricingRequest                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. validate ──────────► EmptyCart / InvalidPercent / InvalidLine      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. eligibility ───────► one flag per line                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. bundler ───────────► pooled saving + OfferStats                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  4. allocator ─────────► LineResult per line (offer share, item disc)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  5. totalizer ─────────► InvoiceTotals (bill discount, round-off)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricedInvoice ──► receipt renderer, persistence                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure and synchronous: no I/O, no shared state. Concurrent checkouts can
//! call it in parallel without coordination.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::allocator::allocate;
use crate::bundler::compute_group_savings;
use crate::eligibility::resolve_lines;
use crate::error::CoreResult;
use crate::money::{Percent, RoundingRule};
use crate::totalizer::totalize;
use crate::types::{
    CartLine, EligibilityMap, InvoiceTotals, LineResult, OfferProgress, OfferStats,
    PromotionConfig,
};
use crate::validation::{validate_cart, validate_percent, validate_rounding_rule};

/// Everything one pricing call needs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingRequest {
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub promotion: PromotionConfig,
    #[serde(default)]
    pub eligibility: EligibilityMap,
    #[serde(default, rename = "billDiscountBps")]
    pub bill_discount: Percent,
}

/// The engine's answer: per-line figures plus reconciled totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricedInvoice {
    pub lines: Vec<LineResult>,
    pub totals: InvoiceTotals,
    pub offer_stats: OfferStats,
    /// Promotion the invoice was priced under.
    pub promotion: PromotionConfig,
}

impl PricedInvoice {
    /// Progress toward the next free unit; see [`OfferStats::progress`].
    pub fn offer_progress(&self) -> Option<OfferProgress> {
        self.offer_stats.progress()
    }
}

/// Prices a cart.
///
/// ## Example
/// ```rust
/// use tally_core::{
///     price_invoice, CartLine, EligibilityMap, EligibilityMode, Money, Percent,
///     PricingRequest, PromotionConfig, PromotionTag, RoundingRule,
/// };
///
/// let request = PricingRequest {
///     lines: vec![
///         CartLine::new("RICE-5KG", Money::from_major(500), 2),
///         CartLine::new("TEA-250", Money::from_major(300), 1)
///             .with_discount(Percent::from_whole(10)),
///     ],
///     promotion: PromotionConfig::new(PromotionTag::Buy1Get1, EligibilityMode::All),
///     eligibility: EligibilityMap::new(),
///     bill_discount: Percent::from_whole(5),
/// };
///
/// let invoice = price_invoice(&request, RoundingRule::whole_unit()).unwrap();
/// assert_eq!(invoice.totals.rounded_total, Money::from_major(928));
/// assert_eq!(invoice.totals.round_off, Money::from_minor(-8));
/// ```
///
/// ## Errors
/// Validation failures are returned before any figure is computed; no
/// partial invoice is ever produced.
pub fn price_invoice(request: &PricingRequest, rounding: RoundingRule) -> CoreResult<PricedInvoice> {
    validate_cart(&request.lines)?;
    validate_percent("bill discount", request.bill_discount)?;
    validate_rounding_rule(rounding)?;

    let eligible = resolve_lines(&request.lines, &request.promotion, &request.eligibility);
    let savings = compute_group_savings(&request.lines, &request.promotion, &eligible);
    let lines = allocate(&request.lines, savings.total, &eligible);
    let totals = totalize(&lines, request.bill_discount, rounding)?;

    debug!(
        tag = %request.promotion.tag,
        mode = %request.promotion.mode,
        lines = lines.len(),
        eligible_lines = eligible.iter().filter(|&&e| e).count(),
        free_units = savings.stats.free_units,
        total = %totals.rounded_total,
        "Invoice priced"
    );

    Ok(PricedInvoice {
        lines,
        totals,
        offer_stats: savings.stats,
        promotion: request.promotion,
    })
}
