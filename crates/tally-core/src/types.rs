//! # Domain Types
//!
//! Core domain types used throughout the pricing pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (owned by the checkout session)                                  │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │   │ PromotionConfig │   │ EligibilityMap  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku_id         │   │  tag            │   │  sku → bool     │       │
//! │  │  unit_price     │   │  mode           │   │  (selected mode │       │
//! │  │  quantity       │   └─────────────────┘   │   only)         │       │
//! │  │  discount (bps) │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  DERIVED (fresh for every pricing call, never stored by the engine)    │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OfferStats    │   │   LineResult    │   │  InvoiceTotals  │       │
//! │  │  free_units     │   │  offer_savings  │   │  pre_round      │       │
//! │  │  remainder      │   │  item_discount  │   │  rounded        │       │
//! │  └─────────────────┘   └─────────────────┘   │  round_off      │       │
//! │                                              └─────────────────┘       │
//! │  PERSISTED (by a collaborator)                                          │
//! │  ┌─────────────────┐                                                    │
//! │  │   SaleRecord    │  snapshot of what the engine computed              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, Percent};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart, fully resolved by the catalog.
///
/// Immutable for the duration of a pricing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// SKU identifier, used for eligibility lookups.
    pub sku_id: String,

    /// Price of one unit, frozen when the line was added.
    pub unit_price: Money,

    /// Units on the line (1..=999).
    pub quantity: u32,

    /// Line discount applied after promotion savings.
    #[serde(default, rename = "discountBps")]
    pub discount: Percent,
}

impl CartLine {
    /// Creates a line with no line discount.
    pub fn new(sku_id: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        CartLine {
            sku_id: sku_id.into(),
            unit_price,
            quantity,
            discount: Percent::zero(),
        }
    }

    /// Sets the line discount.
    pub fn with_discount(mut self, discount: Percent) -> Self {
        self.discount = discount;
        self
    }

    /// Unit price × quantity.
    #[inline]
    pub fn gross_amount(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Promotion Configuration
// =============================================================================

/// The store-wide "buy N get 1 free" offer.
///
/// ## Group Sizes
/// ```text
/// ┌────────────┬────────────┬──────────────────────────────────┐
/// │ Tag        │ Group size │ Free units                       │
/// ├────────────┼────────────┼──────────────────────────────────┤
/// │ none       │     -      │ 0                                │
/// │ buy1get1   │     2      │ 1 per 2 eligible units           │
/// │ buy2get1   │     3      │ 1 per 3 eligible units           │
/// │ buy3get1   │     4      │ 1 per 4 eligible units           │
/// └────────────┴────────────┴──────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PromotionTag {
    /// No promotion running.
    #[default]
    None,
    #[serde(rename = "buy1get1")]
    Buy1Get1,
    #[serde(rename = "buy2get1")]
    Buy2Get1,
    #[serde(rename = "buy3get1")]
    Buy3Get1,
}

impl PromotionTag {
    /// Units per completed group, counting the free one.
    pub const fn group_size(&self) -> Option<usize> {
        match self {
            PromotionTag::None => None,
            PromotionTag::Buy1Get1 => Some(2),
            PromotionTag::Buy2Get1 => Some(3),
            PromotionTag::Buy3Get1 => Some(4),
        }
    }

    /// Wire name, as used in config and JSON.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PromotionTag::None => "none",
            PromotionTag::Buy1Get1 => "buy1get1",
            PromotionTag::Buy2Get1 => "buy2get1",
            PromotionTag::Buy3Get1 => "buy3get1",
        }
    }
}

impl fmt::Display for PromotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromotionTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(PromotionTag::None),
            "buy1get1" => Ok(PromotionTag::Buy1Get1),
            "buy2get1" => Ok(PromotionTag::Buy2Get1),
            "buy3get1" => Ok(PromotionTag::Buy3Get1),
            other => Err(ValidationError::InvalidFormat {
                field: "promotion tag".to_string(),
                reason: format!(
                    "'{}' is not one of none, buy1get1, buy2get1, buy3get1",
                    other
                ),
            }),
        }
    }
}

/// Which SKUs take part in the active promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EligibilityMode {
    /// Every SKU in the store participates.
    #[default]
    All,
    /// Only SKUs flagged in the eligibility map participate.
    Selected,
}

impl EligibilityMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EligibilityMode::All => "all",
            EligibilityMode::Selected => "selected",
        }
    }
}

impl fmt::Display for EligibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EligibilityMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(EligibilityMode::All),
            "selected" => Ok(EligibilityMode::Selected),
            other => Err(ValidationError::InvalidFormat {
                field: "eligibility mode".to_string(),
                reason: format!("'{}' is not one of all, selected", other),
            }),
        }
    }
}

/// The store's active promotion at computation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PromotionConfig {
    pub tag: PromotionTag,
    pub mode: EligibilityMode,
}

impl PromotionConfig {
    pub const fn new(tag: PromotionTag, mode: EligibilityMode) -> Self {
        PromotionConfig { tag, mode }
    }

    /// No promotion.
    pub const fn inactive() -> Self {
        PromotionConfig::new(PromotionTag::None, EligibilityMode::All)
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self.tag, PromotionTag::None)
    }
}

// =============================================================================
// Eligibility Map
// =============================================================================

/// Per-SKU offer eligibility flags from the inventory records.
///
/// Consulted only in [`EligibilityMode::Selected`]. A SKU missing from the
/// map is ineligible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EligibilityMap(HashMap<String, bool>);

impl EligibilityMap {
    pub fn new() -> Self {
        EligibilityMap(HashMap::new())
    }

    /// Sets the flag for one SKU.
    pub fn insert(&mut self, sku_id: impl Into<String>, eligible: bool) {
        self.0.insert(sku_id.into(), eligible);
    }

    /// The raw flag, if the SKU is known.
    pub fn get(&self, sku_id: &str) -> Option<bool> {
        self.0.get(sku_id).copied()
    }

    /// The flag, defaulting to false for unknown SKUs.
    pub fn is_flagged(&self, sku_id: &str) -> bool {
        self.get(sku_id).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for EligibilityMap {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        EligibilityMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// =============================================================================
// Offer Stats
// =============================================================================

/// Group math for one pricing call.
///
/// `free_units = total_units / group_size` (floor), and
/// `remainder_units = total_units % group_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OfferStats {
    /// Units per completed group; zero when no promotion is active.
    pub group_size: usize,
    /// Eligible units across the whole cart.
    pub total_units: usize,
    /// Units that are free.
    pub free_units: usize,
    /// Units that have not yet completed a group.
    pub remainder_units: usize,
}

impl OfferStats {
    /// Stats for a cart with no active promotion.
    pub const fn empty() -> Self {
        OfferStats {
            group_size: 0,
            total_units: 0,
            free_units: 0,
            remainder_units: 0,
        }
    }

    /// Computes the group math for `total_units` eligible units.
    pub const fn for_units(total_units: usize, group_size: usize) -> Self {
        if group_size == 0 {
            return OfferStats::empty();
        }
        OfferStats {
            group_size,
            total_units,
            free_units: total_units / group_size,
            remainder_units: total_units % group_size,
        }
    }

    /// Progress toward the next free unit, for the checkout screen.
    ///
    /// ## User Workflow
    /// ```text
    /// buy2get1, 4 eligible units in cart
    ///      │
    ///      ▼
    /// progress() → { free: 1, in open group: 1, to next free: 2 }
    ///      │
    ///      ▼
    /// UI shows: "Add 2 more eligible items to get another one free"
    /// ```
    ///
    /// Returns `None` when no promotion is active.
    pub const fn progress(&self) -> Option<OfferProgress> {
        if self.group_size == 0 {
            return None;
        }
        Some(OfferProgress {
            group_size: self.group_size,
            free_units: self.free_units,
            units_in_open_group: self.remainder_units,
            units_to_next_free: self.group_size - self.remainder_units,
        })
    }
}

/// Read-only projection of [`OfferStats`] for the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OfferProgress {
    pub group_size: usize,
    pub free_units: usize,
    pub units_in_open_group: usize,
    pub units_to_next_free: usize,
}

// =============================================================================
// Line Result
// =============================================================================

/// A priced cart line, before the bill discount.
///
/// Amounts are exact; the receipt renderer settles them for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineResult {
    pub sku_id: String,
    pub unit_price: Money,
    pub quantity: u32,
    /// Whether the line took part in the promotion.
    pub eligible: bool,
    /// unit_price × quantity
    pub gross_amount: Money,
    /// This line's share of the pooled promotion saving.
    pub offer_savings: Money,
    #[serde(rename = "discountBps")]
    pub discount: Percent,
    /// Line discount taken from the post-offer price.
    pub item_discount_amount: Money,
    /// gross − offer savings − item discount
    pub net_amount: Money,
}

impl LineResult {
    /// Gross amount less the offer share.
    #[inline]
    pub fn price_after_offer(&self) -> Money {
        self.gross_amount - self.offer_savings
    }

    /// Offer savings plus item discount.
    #[inline]
    pub fn total_savings(&self) -> Money {
        self.offer_savings + self.item_discount_amount
    }
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// The reconciled invoice.
///
/// Every amount is settled to minor units. `rounded_total − round_off` is
/// exactly `pre_round_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceTotals {
    pub gross_subtotal: Money,
    pub offer_savings_total: Money,
    pub item_discount_total: Money,
    #[serde(rename = "billDiscountBps")]
    pub bill_discount: Percent,
    pub bill_discount_amount: Money,
    /// Amount due before payment rounding.
    pub pre_round_total: Money,
    /// Amount due.
    pub rounded_total: Money,
    /// Signed: positive when rounded up, negative when rounded down.
    pub round_off: Money,
}

impl InvoiceTotals {
    /// All savings shown on the receipt, excluding round-off.
    pub fn total_savings(&self) -> Money {
        self.offer_savings_total + self.item_discount_total + self.bill_discount_amount
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A persisted sale, as handed back by the persistence collaborator.
/// Uses snapshot pattern to freeze what the engine computed at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRecord {
    /// Receipt number issued by persistence (display only).
    pub receipt_number: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Promotion that was active at sale time (display only).
    #[serde(default)]
    pub promotion_tag: PromotionTag,
    #[serde(default, rename = "billDiscountBps")]
    pub bill_discount: Percent,
    pub lines: Vec<SaleRecordLine>,
    /// Final amount charged.
    pub total: Money,
}

/// A line of a persisted sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRecordLine {
    pub sku_id: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default, rename = "discountBps")]
    pub discount: Percent,
    /// Offer share allocated at sale time; absent on legacy records.
    #[serde(default)]
    pub offer_savings: Option<Money>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_sizes() {
        assert_eq!(PromotionTag::None.group_size(), None);
        assert_eq!(PromotionTag::Buy1Get1.group_size(), Some(2));
        assert_eq!(PromotionTag::Buy2Get1.group_size(), Some(3));
        assert_eq!(PromotionTag::Buy3Get1.group_size(), Some(4));
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!("buy2get1".parse::<PromotionTag>().unwrap(), PromotionTag::Buy2Get1);
        assert_eq!(" BUY1GET1 ".parse::<PromotionTag>().unwrap(), PromotionTag::Buy1Get1);
        assert_eq!("none".parse::<PromotionTag>().unwrap(), PromotionTag::None);
        assert!("buy4get1".parse::<PromotionTag>().is_err());

        assert_eq!("selected".parse::<EligibilityMode>().unwrap(), EligibilityMode::Selected);
        assert!("some".parse::<EligibilityMode>().is_err());
    }

    #[test]
    fn test_tag_wire_names() {
        let json = serde_json::to_string(&PromotionTag::Buy3Get1).unwrap();
        assert_eq!(json, "\"buy3get1\"");

        let config: PromotionConfig =
            serde_json::from_str(r#"{"tag":"buy1get1","mode":"selected"}"#).unwrap();
        assert_eq!(
            config,
            PromotionConfig::new(PromotionTag::Buy1Get1, EligibilityMode::Selected)
        );
        assert!(config.is_active());
        assert!(!PromotionConfig::inactive().is_active());
    }

    #[test]
    fn test_offer_stats_group_math() {
        let stats = OfferStats::for_units(5, 2);
        assert_eq!(stats.free_units, 2);
        assert_eq!(stats.remainder_units, 1);

        let stats = OfferStats::for_units(0, 3);
        assert_eq!(stats.free_units, 0);
        assert_eq!(stats.remainder_units, 0);
    }

    #[test]
    fn test_offer_progress_view() {
        let progress = OfferStats::for_units(4, 3).progress().unwrap();
        assert_eq!(progress.free_units, 1);
        assert_eq!(progress.units_in_open_group, 1);
        assert_eq!(progress.units_to_next_free, 2);

        assert!(OfferStats::empty().progress().is_none());
    }

    #[test]
    fn test_eligibility_map_defaults_to_false() {
        let map: EligibilityMap = [("SOAP-01", true), ("RICE-5KG", false)].into_iter().collect();
        assert!(map.is_flagged("SOAP-01"));
        assert!(!map.is_flagged("RICE-5KG"));
        assert!(!map.is_flagged("UNKNOWN"));
        assert_eq!(map.get("UNKNOWN"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_cart_line_from_json() {
        let line: CartLine = serde_json::from_str(
            r#"{"skuId":"TEA-250","unitPrice":"300","quantity":1,"discountBps":1000}"#,
        )
        .unwrap();
        assert_eq!(line.gross_amount(), Money::from_major(300));
        assert_eq!(line.discount, Percent::from_whole(10));

        let plain: CartLine =
            serde_json::from_str(r#"{"skuId":"TEA-250","unitPrice":"300","quantity":2}"#).unwrap();
        assert!(plain.discount.is_zero());
    }
}
