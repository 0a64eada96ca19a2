//! # Store Configuration
//!
//! Settings the checkout driver loads at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TALLY_*`)
//! 2. Defaults (this file)
//!
//! A request file may still override the promotion for a single run; see
//! `main.rs`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::validation::validate_rounding_rule;
use tally_core::{EligibilityMode, Money, PromotionConfig, PromotionTag, RoundingRule};

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Store name (printed on receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Promotion running in the store right now
    pub promotion: PromotionConfig,

    /// Payment rounding step, e.g. 1.00 or 0.05
    pub rounding_step: Money,

    /// Receipt width in characters
    pub paper_width: usize,
}

impl Default for StoreConfig {
    /// ## Default Values
    /// - Store: "Tally Dev Store"
    /// - Currency: ₹
    /// - Promotion: none
    /// - Rounding: whole units
    /// - Paper: 42 columns
    fn default() -> Self {
        StoreConfig {
            store_name: "Tally Dev Store".to_string(),
            currency_symbol: "₹".to_string(),
            promotion: PromotionConfig::inactive(),
            rounding_step: RoundingRule::whole_unit().step(),
            paper_width: 42,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from environment variables over defaults.
    ///
    /// ## Environment Variables
    /// - `TALLY_STORE_NAME`: store name
    /// - `TALLY_CURRENCY_SYMBOL`: currency symbol
    /// - `TALLY_PROMO_TAG`: `none`, `buy1get1`, `buy2get1` or `buy3get1`
    /// - `TALLY_PROMO_MODE`: `all` or `selected`
    /// - `TALLY_ROUNDING_STEP`: decimal step, e.g. `0.05`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        if let Some(store_name) = lookup("TALLY_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("TALLY_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(tag) = lookup("TALLY_PROMO_TAG") {
            config.promotion.tag = PromotionTag::from_str(&tag)
                .map_err(|_| ConfigError::InvalidValue("TALLY_PROMO_TAG".to_string()))?;
        }

        if let Some(mode) = lookup("TALLY_PROMO_MODE") {
            config.promotion.mode = EligibilityMode::from_str(&mode)
                .map_err(|_| ConfigError::InvalidValue("TALLY_PROMO_MODE".to_string()))?;
        }

        if let Some(step) = lookup("TALLY_ROUNDING_STEP") {
            let invalid = || ConfigError::InvalidValue("TALLY_ROUNDING_STEP".to_string());
            let step = Decimal::from_str(step.trim()).map_err(|_| invalid())?;
            let step = Money::from_decimal(step);
            validate_rounding_rule(RoundingRule::new(step)).map_err(|_| invalid())?;
            config.rounding_step = step;
        }

        Ok(config)
    }

    /// The payment rounding rule for this store.
    pub fn rounding_rule(&self) -> RoundingRule {
        RoundingRule::new(self.rounding_step)
    }

    /// Formats an amount with the store's currency symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = StoreConfig::default();
    /// assert_eq!(config.format_currency(Money::from_minor(-8)), "-₹0.08");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let settled = amount.settle();
        if settled.is_negative() {
            format!("-{}{}", self.currency_symbol, -settled)
        } else {
            format!("{}{}", self.currency_symbol, settled)
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
