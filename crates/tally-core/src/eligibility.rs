//! # Eligibility
//!
//! Decides which cart lines take part in the active promotion.
//!
//! ```text
//! tag == none         → nobody
//! mode == all         → everybody
//! mode == selected    → eligibility_map[sku], unknown SKU → false
//! ```

use crate::types::{CartLine, EligibilityMap, EligibilityMode, PromotionConfig};

/// Whether one SKU participates in the promotion.
///
/// ## Example
/// ```rust
/// use tally_core::eligibility::is_eligible;
/// use tally_core::{EligibilityMap, EligibilityMode, PromotionConfig, PromotionTag};
///
/// let config = PromotionConfig::new(PromotionTag::Buy1Get1, EligibilityMode::Selected);
/// let map: EligibilityMap = [("SOAP-01", true)].into_iter().collect();
///
/// assert!(is_eligible("SOAP-01", &config, &map));
/// assert!(!is_eligible("RICE-5KG", &config, &map));
/// ```
pub fn is_eligible(sku_id: &str, config: &PromotionConfig, eligibility: &EligibilityMap) -> bool {
    if !config.is_active() {
        return false;
    }

    match config.mode {
        EligibilityMode::All => true,
        EligibilityMode::Selected => eligibility.is_flagged(sku_id),
    }
}

/// Resolves every line once, in cart order.
pub fn resolve_lines(
    lines: &[CartLine],
    config: &PromotionConfig,
    eligibility: &EligibilityMap,
) -> Vec<bool> {
    lines
        .iter()
        .map(|line| is_eligible(&line.sku_id, config, eligibility))
        .collect()
}
