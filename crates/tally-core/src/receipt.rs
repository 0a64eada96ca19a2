//! # Receipt Projection
//!
//! Re-derives invoice totals from a persisted sale, for reprints and
//! consistency checks.
//!
//! ## Live Checkout vs. Reprint
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Checkout:  cart ─► bundle ─► allocate ─► totalize ─► SaleRecord       │
//! │                                                  (snapshot of shares)   │
//! │                                                                         │
//! │  Reprint:   SaleRecord ─► price_line(persisted share) ─► totalize      │
//! │                            ▲                                            │
//! │                            └── never re-bundled: the promotion running │
//! │                                today may not be the one at sale time   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both paths share the same line formula, totalizer and rounding rule, so a
//! reprint cannot disagree with the till on a midpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::allocator::price_line;
use crate::engine::PricedInvoice;
use crate::error::CoreResult;
use crate::money::{Money, RoundingRule};
use crate::totalizer::totalize;
use crate::types::{CartLine, InvoiceTotals, LineResult, SaleRecord, SaleRecordLine};
use crate::validation::{validate_percent, validate_record_lines};

/// Totals recomputed from a persisted sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptProjection {
    pub receipt_number: String,
    pub lines: Vec<LineResult>,
    pub totals: InvoiceTotals,
    /// Recomputed rounded total minus the persisted total, when they differ.
    pub discrepancy: Option<Money>,
}

impl ReceiptProjection {
    /// True when the reprint matches what was charged.
    pub fn is_consistent(&self) -> bool {
        self.discrepancy.is_none()
    }
}

impl SaleRecord {
    /// Freezes a priced invoice for the persistence collaborator.
    ///
    /// The receipt number and timestamp come from persistence and are only
    /// displayed.
    pub fn from_priced(
        receipt_number: impl Into<String>,
        created_at: DateTime<Utc>,
        invoice: &PricedInvoice,
    ) -> Self {
        SaleRecord {
            receipt_number: receipt_number.into(),
            created_at,
            promotion_tag: invoice.promotion.tag,
            bill_discount: invoice.totals.bill_discount,
            lines: invoice
                .lines
                .iter()
                .map(|line| SaleRecordLine {
                    sku_id: line.sku_id.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    discount: line.discount,
                    offer_savings: Some(line.offer_savings),
                })
                .collect(),
            total: invoice.totals.rounded_total,
        }
    }
}

/// Projects a persisted sale back into receipt lines and totals.
///
/// Lines without a persisted offer share are projected with none.
///
/// ## Errors
/// Same as [`totalize`], plus line validation of the stored tuples.
pub fn project_receipt(record: &SaleRecord, rounding: RoundingRule) -> CoreResult<ReceiptProjection> {
    validate_record_lines(&record.lines)?;
    validate_percent("bill discount", record.bill_discount)?;

    let lines: Vec<LineResult> = record
        .lines
        .iter()
        .map(|stored| {
            let line = CartLine {
                sku_id: stored.sku_id.clone(),
                unit_price: stored.unit_price,
                quantity: stored.quantity,
                discount: stored.discount,
            };
            let offer_savings = stored.offer_savings.unwrap_or_else(Money::zero);
            price_line(&line, offer_savings.is_positive(), line.gross_amount(), offer_savings)
        })
        .collect();

    let totals = totalize(&lines, record.bill_discount, rounding)?;

    let difference = totals.rounded_total - record.total;
    let discrepancy = if difference.is_zero() {
        None
    } else {
        warn!(
            receipt = %record.receipt_number,
            persisted = %record.total,
            recomputed = %totals.rounded_total,
            "Receipt projection disagrees with persisted total"
        );
        Some(difference)
    };

    debug!(
        receipt = %record.receipt_number,
        lines = lines.len(),
        total = %totals.rounded_total,
        "Receipt projected"
    );

    Ok(ReceiptProjection {
        receipt_number: record.receipt_number.clone(),
        lines,
        totals,
        discrepancy,
    })
}
