//! Plain-text receipt layout for a fixed-width printer.

use tally_core::{InvoiceTotals, LineResult, Money, OfferProgress};

use crate::config::StoreConfig;

/// Lays out a receipt body.
///
/// ```text
/// RICE-5KG 2 x ₹500.00              ₹1000.00
///   Offer                            -₹230.77
/// ------------------------------------------
/// Round-off                            -₹0.08
/// TOTAL                               ₹928.00
/// ```
pub fn render_receipt(
    config: &StoreConfig,
    heading: Option<&str>,
    lines: &[LineResult],
    totals: &InvoiceTotals,
    progress: Option<OfferProgress>,
) -> String {
    let width = config.paper_width;
    let rule = "-".repeat(width);
    let mut out = Vec::new();

    out.push(center(&config.store_name, width));
    if let Some(heading) = heading {
        out.push(center(heading, width));
    }
    out.push(rule.clone());

    for line in lines {
        let label = format!(
            "{} {} x {}",
            line.sku_id,
            line.quantity,
            config.format_currency(line.unit_price)
        );
        out.push(row(&label, &config.format_currency(line.gross_amount), width));

        if line.offer_savings.is_positive() {
            out.push(row("  Offer", &config.format_currency(-line.offer_savings), width));
        }
        if line.item_discount_amount.is_positive() {
            let label = format!("  Discount {}", line.discount);
            out.push(row(&label, &config.format_currency(-line.item_discount_amount), width));
        }
    }

    out.push(rule.clone());
    out.push(row("Subtotal", &config.format_currency(totals.gross_subtotal), width));
    push_saving(&mut out, config, "Offer savings", totals.offer_savings_total);
    push_saving(&mut out, config, "Item discounts", totals.item_discount_total);
    if !totals.bill_discount.is_zero() {
        let label = format!("Bill discount {}", totals.bill_discount);
        out.push(row(&label, &config.format_currency(-totals.bill_discount_amount), width));
    }
    if !totals.round_off.is_zero() {
        out.push(row("Round-off", &config.format_currency(totals.round_off), width));
    }
    out.push(rule.clone());
    out.push(row("TOTAL", &config.format_currency(totals.rounded_total), width));

    let saved = totals.total_savings();
    if saved.is_positive() {
        out.push(center(&format!("You saved {}", config.format_currency(saved)), width));
    }

    if let Some(progress) = progress {
        if progress.units_in_open_group > 0 {
            out.push(center(
                &format!(
                    "Add {} more to get another free",
                    progress.units_to_next_free
                ),
                width,
            ));
        }
    }

    out.join("\n")
}

fn push_saving(out: &mut Vec<String>, config: &StoreConfig, label: &str, amount: Money) {
    if amount.is_positive() {
        out.push(row(label, &config.format_currency(-amount), config.paper_width));
    }
}

/// Left label, right-aligned amount. Counts chars, not bytes, so currency
/// symbols outside ASCII still line up.
fn row(label: &str, amount: &str, width: usize) -> String {
    let used = label.chars().count() + amount.chars().count();
    let pad = width.saturating_sub(used).max(1);
    format!("{}{}{}", label, " ".repeat(pad), amount)
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{
        price_invoice, CartLine, EligibilityMode, Percent, PricingRequest, PromotionConfig,
        PromotionTag, RoundingRule,
    };

    fn invoice() -> tally_core::PricedInvoice {
        let request = PricingRequest {
            lines: vec![
                CartLine::new("RICE-5KG", Money::from_major(500), 2),
                CartLine::new("TEA-250", Money::from_major(300), 1)
                    .with_discount(Percent::from_whole(10)),
            ],
            promotion: PromotionConfig::new(PromotionTag::Buy1Get1, EligibilityMode::All),
            bill_discount: Percent::from_whole(5),
            ..Default::default()
        };
        price_invoice(&request, RoundingRule::whole_unit()).unwrap()
    }

    #[test]
    fn test_row_alignment() {
        let line = row("TOTAL", "₹928.00", 20);
        assert_eq!(line.chars().count(), 20);
        assert!(line.starts_with("TOTAL "));
        assert!(line.ends_with("₹928.00"));
    }

    #[test]
    fn test_row_never_collides() {
        assert_eq!(row("LONG-LABEL", "1.00", 5), "LONG-LABEL 1.00");
    }

    #[test]
    fn test_receipt_shows_every_reconciling_line() {
        let config = StoreConfig::default();
        let invoice = invoice();
        let text = render_receipt(
            &config,
            None,
            &invoice.lines,
            &invoice.totals,
            invoice.offer_progress(),
        );

        assert!(text.contains("RICE-5KG 2 x ₹500.00"));
        assert!(text.contains("-₹230.77"));
        assert!(text.contains("-₹69.23"));
        assert!(text.contains("Discount 10%"));
        assert!(text.contains("Bill discount 5%"));
        assert!(text.contains("-₹48.85"));
        assert!(text.lines().any(|l| l.starts_with("Round-off") && l.ends_with("-₹0.08")));
        assert!(text.lines().any(|l| l.starts_with("TOTAL") && l.ends_with("₹928.00")));
        assert!(text.contains("Add 1 more to get another free"));
    }
}
