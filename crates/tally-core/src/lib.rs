//! # tally-core: Checkout Pricing for Tally
//!
//! This crate turns a cart into a fully reconciled invoice: store-wide
//! "buy N get 1 free" bundling, proportional discount allocation, line and
//! bill discounts, and a single signed round-off. Everything here is a pure
//! function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Tally Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │         Checkout front-end / tally-cli / receipt printer        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ PricingRequest                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   eligibility ─► bundler ─► allocator ─► totalizer              │   │
//! │  │        ▲                                     │                  │   │
//! │  │        │            engine::price_invoice    ▼                  │   │
//! │  │   PromotionConfig                       PricedInvoice           │   │
//! │  │                                              │                  │   │
//! │  │   receipt::project_receipt ◄── SaleRecord ◄──┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal Money, basis-point Percent, RoundingRule
//! - [`types`] - Cart lines, promotion config, priced results, sale records
//! - [`eligibility`] - Which lines take part in the promotion
//! - [`bundler`] - Store-wide group saving, cheapest units free
//! - [`allocator`] - Revenue-share split of the saving, line discounts
//! - [`totalizer`] - Bill discount, rounding and round-off
//! - [`engine`] - The `price_invoice` entry point
//! - [`receipt`] - Re-projection of persisted sales
//! - [`error`] / [`validation`] - Typed errors and input rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same request, same invoice, byte for byte
//! 2. **No I/O**: persistence and printing live outside this crate
//! 3. **Exact Money**: intermediates are never rounded; the totalizer
//!    settles once
//! 4. **Explicit Errors**: invalid input is rejected before any figure is
//!    computed
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{
//!     price_invoice, CartLine, Money, PricingRequest, PromotionConfig, PromotionTag,
//!     EligibilityMode, RoundingRule,
//! };
//!
//! let request = PricingRequest {
//!     lines: vec![CartLine::new("SOAP-01", Money::from_major(40), 2)],
//!     promotion: PromotionConfig::new(PromotionTag::Buy1Get1, EligibilityMode::All),
//!     ..Default::default()
//! };
//!
//! let invoice = price_invoice(&request, RoundingRule::whole_unit()).unwrap();
//! assert_eq!(invoice.totals.offer_savings_total, Money::from_major(40));
//! assert_eq!(invoice.totals.rounded_total, Money::from_major(40));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod bundler;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod money;
pub mod receipt;
pub mod totalizer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::{price_invoice, PricedInvoice, PricingRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent, RoundingRule};
pub use receipt::{project_receipt, ReceiptProjection};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line
///
/// Catches keying slips (1000 instead of 10) before they reach the till.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum unit price, in major currency units
///
/// Keeps every product the pipeline forms (pool × line gross, before the
/// division) inside `Decimal` range for a full cart.
pub const MAX_UNIT_PRICE: i64 = 1_000_000;
