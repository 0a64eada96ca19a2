//! # Validation Module
//!
//! Input validation for pricing requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Checkout UI                                                  │
//! │  └── Immediate feedback while keying quantities and discounts          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Deserialization                                              │
//! │  └── Types: quantities are unsigned, amounts are decimals              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── SKU format, price sign, quantity bounds                           │
//! │  ├── Discount rates within 0%..=100% (rejected, never clamped)         │
//! │  └── Cart not empty, not oversized                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Pricing pipeline runs only on a fully valid request                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Percent, RoundingRule};
use crate::types::{CartLine, SaleRecordLine};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
/// - Is matched against the eligibility map as-is, so surrounding
///   whitespace is rejected rather than trimmed
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    if sku.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.trim() != sku {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must not start or end with whitespace".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - Must not exceed MAX_UNIT_PRICE
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit price".to_string(),
            value: price.to_string(),
        });
    }

    let max = Money::from_major(MAX_UNIT_PRICE);
    if price > max {
        return Err(ValidationError::TooLarge {
            field: "unit price".to_string(),
            max: max.to_string(),
            value: price.to_string(),
        });
    }

    Ok(())
}

/// Validates a discount rate.
///
/// ## Example
/// ```rust
/// use tally_core::money::Percent;
/// use tally_core::validation::validate_percent;
///
/// assert!(validate_percent("bill discount", Percent::from_whole(100)).is_ok());
/// assert!(validate_percent("bill discount", Percent::from_bps(10_001)).is_err());
/// ```
pub fn validate_percent(field: &str, rate: Percent) -> CoreResult<()> {
    if !rate.is_within_range() {
        return Err(CoreError::InvalidPercent {
            field: field.to_string(),
            bps: rate.bps(),
        });
    }

    Ok(())
}

/// Validates a payment rounding rule.
///
/// ## Rules
/// - The step must be at least one minor unit
pub fn validate_rounding_rule(rule: RoundingRule) -> ValidationResult<()> {
    if rule.step() < Money::from_minor(1) {
        return Err(ValidationError::MustBePositive {
            field: "rounding step".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates one cart line, tagging failures with the line's position.
pub fn validate_cart_line(index: usize, line: &CartLine) -> CoreResult<()> {
    let tag = |source: ValidationError| CoreError::InvalidLine {
        index,
        sku: line.sku_id.clone(),
        source,
    };

    validate_sku(&line.sku_id).map_err(tag)?;
    validate_unit_price(line.unit_price).map_err(tag)?;
    validate_quantity(line.quantity).map_err(tag)?;
    validate_percent(&line_discount_field(index, &line.sku_id), line.discount)?;

    Ok(())
}

/// Field name for a line's discount, so the error points at the line.
fn line_discount_field(index: usize, sku: &str) -> String {
    format!("Line {} ({}) discount", index, sku)
}

/// Validates the cart as a whole.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Checkout pressed                                                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_cart(lines) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── no lines / no units? → EmptyCart                             │
/// │       ├── > 100 lines?         → CartTooLarge                          │
/// │       ├── bad line?            → InvalidLine / InvalidPercent          │
/// │       │                                                                 │
/// │       └── OK → price_invoice continues                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_cart(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if lines.len() > MAX_CART_LINES {
        return Err(CoreError::CartTooLarge {
            max: MAX_CART_LINES,
        });
    }

    // Zero total quantity is an empty cart, not a bad line
    if lines.iter().all(|l| l.quantity == 0) {
        return Err(CoreError::EmptyCart);
    }

    for (index, line) in lines.iter().enumerate() {
        validate_cart_line(index, line)?;
    }

    Ok(())
}

/// Validates the lines of a persisted sale before re-projection.
pub fn validate_record_lines(lines: &[SaleRecordLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    for (index, line) in lines.iter().enumerate() {
        let tag = |source: ValidationError| CoreError::InvalidLine {
            index,
            sku: line.sku_id.clone(),
            source,
        };
        validate_unit_price(line.unit_price).map_err(tag)?;
        validate_quantity(line.quantity).map_err(tag)?;
        validate_percent(&line_discount_field(index, &line.sku_id), line.discount)?;
        if let Some(savings) = line.offer_savings {
            if savings.is_negative() {
                return Err(tag(ValidationError::Negative {
                    field: "offer savings".to_string(),
                    value: savings.to_string(),
                }));
            }
            let gross = line.unit_price.multiply_quantity(line.quantity);
            if savings > gross {
                return Err(tag(ValidationError::TooLarge {
                    field: "offer savings".to_string(),
                    max: gross.to_string(),
                    value: savings.to_string(),
                }));
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
