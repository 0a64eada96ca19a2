//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Pricing request rejected                       │
//! │  │   ├── EmptyCart        no lines / no quantity / nothing to bill     │
//! │  │   ├── InvalidPercent   a discount rate outside 0%..=100%            │
//! │  │   ├── CartTooLarge     more lines than a single invoice allows      │
//! │  │   └── InvalidLine      a cart line failed field validation          │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  tally-cli errors (app)                                                │
//! │  └── ConfigError      - Bad TALLY_* environment values                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → anyhow (CLI) → exit status        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, field, value)
//! 3. Nothing is clamped or defaulted: a bad request never yields an invoice
//!
//! The allocator's zero-denominator guard is not an error variant: it is
//! an internal assertion, logged and short-circuited to zero savings.

use thiserror::Error;

use crate::money::Percent;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing errors returned to the checkout caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Nothing to invoice.
    ///
    /// ## When This Occurs
    /// - The cart has no lines
    /// - Every line has quantity zero
    /// - The gross subtotal is zero or negative
    #[error("Cart is empty: nothing to invoice")]
    EmptyCart,

    /// A line or bill discount outside 0%..=100%.
    ///
    /// ## User Workflow
    /// ```text
    /// Cashier keys 120% bill discount
    ///      │
    ///      ▼
    /// InvalidPercent { field: "bill discount", bps: 12000 }
    ///      │
    ///      ▼
    /// UI shows: "bill discount must be between 0% and 100%, got 120%"
    /// ```
    #[error("{field} must be between 0% and 100%, got {}", as_percent(.bps))]
    InvalidPercent { field: String, bps: u32 },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A cart line failed validation.
    #[error("Line {index} ({sku}): {source}")]
    InvalidLine {
        index: usize,
        sku: String,
        #[source]
        source: ValidationError,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

fn as_percent(bps: &u32) -> Percent {
    Percent::from_bps(*bps)
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any pricing step runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Amount above the accepted ceiling.
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: String,
        max: String,
        value: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: String },

    /// Invalid format (e.g., SKU with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CoreError::EmptyCart.to_string(),
            "Cart is empty: nothing to invoice"
        );

        let err = CoreError::InvalidPercent {
            field: "bill discount".to_string(),
            bps: 12_000,
        };
        assert_eq!(
            err.to_string(),
            "bill discount must be between 0% and 100%, got 120%"
        );

        let err = CoreError::InvalidPercent {
            field: "line discount".to_string(),
            bps: 10_050,
        };
        assert_eq!(
            err.to_string(),
            "line discount must be between 0% and 100%, got 100.5%"
        );
    }

    #[test]
    fn test_invalid_line_carries_context() {
        let err = CoreError::InvalidLine {
            index: 2,
            sku: "SOAP-01".to_string(),
            source: ValidationError::MustBePositive {
                field: "quantity".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Line 2 (SOAP-01): quantity must be positive");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
