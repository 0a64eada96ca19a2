//! # Tally Checkout Driver
//!
//! Prices a checkout request with `tally-core` and prints the result.
//!
//! ## Usage
//! ```bash
//! # Price a cart, JSON on stdout
//! tally --request ./cart.json
//!
//! # Same cart as a printed receipt
//! tally --request ./cart.json --text
//!
//! # Freeze the priced cart as a sale record for persistence
//! tally --request ./cart.json --snapshot R-000123 > sale.json
//!
//! # Reprint a persisted sale
//! tally --reprint ./sale.json --text
//! ```
//!
//! ## Request File
//! ```json
//! {
//!   "lines": [
//!     { "skuId": "RICE-5KG", "unitPrice": "500.00", "quantity": 2 },
//!     { "skuId": "TEA-250", "unitPrice": "300.00", "quantity": 1, "discountBps": 1000 }
//!   ],
//!   "eligibility": { "RICE-5KG": true },
//!   "billDiscountBps": 500,
//!   "promotion": { "tag": "buy1get1", "mode": "all" }
//! }
//! ```
//! `promotion` is optional and overrides the store's configured promotion
//! for this run only.
//!
//! Logs go to stderr so stdout stays machine-readable.

mod config;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tally_core::{
    price_invoice, project_receipt, CartLine, EligibilityMap, Percent, PricingRequest,
    PromotionConfig, SaleRecord,
};

use crate::config::StoreConfig;
use crate::render::render_receipt;

/// A checkout request as read from disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutFile {
    lines: Vec<CartLine>,
    #[serde(default)]
    eligibility: EligibilityMap,
    #[serde(default, rename = "billDiscountBps")]
    bill_discount: Percent,
    #[serde(default)]
    promotion: Option<PromotionConfig>,
}

impl CheckoutFile {
    /// Builds the engine request, falling back to the store's promotion.
    fn into_request(self, store_promotion: PromotionConfig) -> PricingRequest {
        PricingRequest {
            lines: self.lines,
            promotion: self.promotion.unwrap_or(store_promotion),
            eligibility: self.eligibility,
            bill_discount: self.bill_discount,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Price {
        request: PathBuf,
        snapshot: Option<String>,
    },
    Reprint {
        record: PathBuf,
    },
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    command: Command,
    text: bool,
}

const USAGE: &str = "\
Tally Checkout Pricing

Usage: tally [OPTIONS]

Options:
  -r, --request <PATH>      Checkout request file (JSON) to price
  -s, --snapshot <NUMBER>   Emit a sale record with this receipt number
  -p, --reprint <PATH>      Re-project a persisted sale record (JSON)
  -t, --text                Print a text receipt instead of JSON
  -h, --help                Show this help message

Environment:
  TALLY_STORE_NAME, TALLY_CURRENCY_SYMBOL, TALLY_PROMO_TAG,
  TALLY_PROMO_MODE, TALLY_ROUNDING_STEP, RUST_LOG";

fn parse_args(args: &[String]) -> Result<Options> {
    let mut request = None;
    let mut snapshot = None;
    let mut reprint = None;
    let mut text = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--request" | "-r" => {
                request = Some(PathBuf::from(value_after(args, i)?));
                i += 1;
            }
            "--snapshot" | "-s" => {
                snapshot = Some(value_after(args, i)?.to_string());
                i += 1;
            }
            "--reprint" | "-p" => {
                reprint = Some(PathBuf::from(value_after(args, i)?));
                i += 1;
            }
            "--text" | "-t" => text = true,
            "--help" | "-h" => {
                return Ok(Options {
                    command: Command::Help,
                    text,
                })
            }
            other => bail!("unknown argument '{}' (see --help)", other),
        }
        i += 1;
    }

    let command = match (request, reprint) {
        (Some(request), None) => Command::Price { request, snapshot },
        (None, Some(record)) if snapshot.is_none() => Command::Reprint { record },
        (None, Some(_)) => bail!("--snapshot only applies to --request"),
        (Some(_), Some(_)) => bail!("--request and --reprint are mutually exclusive"),
        (None, None) => bail!("one of --request or --reprint is required (see --help)"),
    };

    Ok(Options { command, text })
}

fn value_after(args: &[String], i: usize) -> Result<&str> {
    match args.get(i + 1) {
        Some(value) => Ok(value.as_str()),
        None => bail!("{} needs a value", args[i]),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;

    if options.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = StoreConfig::from_env().context("invalid store configuration")?;
    debug!(
        store = %config.store_name,
        tag = %config.promotion.tag,
        mode = %config.promotion.mode,
        step = %config.rounding_step,
        "Store configuration loaded"
    );

    match options.command {
        Command::Price { request, snapshot } => {
            let checkout: CheckoutFile = read_json(&request)?;
            let request = checkout.into_request(config.promotion);
            let invoice = price_invoice(&request, config.rounding_rule())
                .context("checkout could not be priced")?;

            info!(
                lines = invoice.lines.len(),
                total = %invoice.totals.rounded_total,
                round_off = %invoice.totals.round_off,
                "Checkout priced"
            );

            if let Some(receipt_number) = snapshot {
                let record = SaleRecord::from_priced(receipt_number, Utc::now(), &invoice);
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else if options.text {
                println!(
                    "{}",
                    render_receipt(
                        &config,
                        None,
                        &invoice.lines,
                        &invoice.totals,
                        invoice.offer_progress(),
                    )
                );
            } else {
                println!("{}", serde_json::to_string_pretty(&invoice)?);
            }
        }
        Command::Reprint { record } => {
            let sale: SaleRecord = read_json(&record)?;
            let projection = project_receipt(&sale, config.rounding_rule())
                .with_context(|| format!("receipt {} could not be projected", sale.receipt_number))?;

            info!(
                receipt = %projection.receipt_number,
                consistent = projection.is_consistent(),
                "Receipt reprinted"
            );

            if options.text {
                let heading = format!(
                    "Receipt {} ({})",
                    sale.receipt_number,
                    sale.created_at.format("%Y-%m-%d %H:%M")
                );
                println!(
                    "{}",
                    render_receipt(&config, Some(&heading), &projection.lines, &projection.totals, None)
                );
                if let Some(diff) = projection.discrepancy {
                    println!("** Differs from amount charged by {} **", config.format_currency(diff));
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&projection)?);
            }
        }
        Command::Help => {}
    }

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_core=trace` - Per-line allocation detail
/// - Default: INFO, DEBUG for tally crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,tally_core=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{EligibilityMode, Money, PromotionTag};

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("tally")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_price() {
        let options = parse_args(&args(&["--request", "cart.json", "-t"])).unwrap();
        assert!(options.text);
        assert_eq!(
            options.command,
            Command::Price {
                request: PathBuf::from("cart.json"),
                snapshot: None
            }
        );
    }

    #[test]
    fn test_parse_snapshot_and_reprint() {
        let options = parse_args(&args(&["-r", "cart.json", "-s", "R-1"])).unwrap();
        assert!(matches!(options.command, Command::Price { snapshot: Some(ref n), .. } if n == "R-1"));

        let options = parse_args(&args(&["--reprint", "sale.json"])).unwrap();
        assert_eq!(
            options.command,
            Command::Reprint {
                record: PathBuf::from("sale.json")
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--request"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["-r", "a.json", "-p", "b.json"])).is_err());
        assert!(parse_args(&args(&["-p", "b.json", "-s", "R-1"])).is_err());
        assert_eq!(parse_args(&args(&["-h"])).unwrap().command, Command::Help);
    }

    #[test]
    fn test_file_promotion_overrides_store() {
        let file: CheckoutFile = serde_json::from_str(
            r#"{
                "lines": [{"skuId": "SOAP-01", "unitPrice": "40", "quantity": 2}],
                "promotion": {"tag": "buy1get1", "mode": "all"}
            }"#,
        )
        .unwrap();
        let request = file.into_request(PromotionConfig::inactive());

        assert_eq!(request.promotion.tag, PromotionTag::Buy1Get1);
        assert!(request.bill_discount.is_zero());
    }

    #[test]
    fn test_store_promotion_used_by_default() {
        let file: CheckoutFile = serde_json::from_str(
            r#"{
                "lines": [{"skuId": "SOAP-01", "unitPrice": "40", "quantity": 2}],
                "eligibility": {"SOAP-01": true},
                "billDiscountBps": 250
            }"#,
        )
        .unwrap();
        let store = PromotionConfig::new(PromotionTag::Buy2Get1, EligibilityMode::Selected);
        let request = file.into_request(store);

        assert_eq!(request.promotion, store);
        assert!(request.eligibility.is_flagged("SOAP-01"));
        assert_eq!(request.bill_discount, Percent::from_bps(250));
        assert_eq!(request.lines[0].unit_price, Money::from_major(40));
    }
}
