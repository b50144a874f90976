//! `agency tally` and `agency tally-file`
//!
//! Both print the same summary. `tally` reads the database; `tally-file`
//! reads exported purchase and sale records (JSON arrays in the web client's
//! camelCase shape) and never opens the database.

use std::fs;
use std::path::{Path, PathBuf};

use agency_core::tally::{PurchaseRecord, SaleRecord};
use agency_core::{tally_records, TallyPolicy, TallyReport};
use anyhow::{Context as _, Result};
use clap::Args;
use comfy_table::Cell;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::{Context, RangeArgs};
use crate::config::AppConfig;
use crate::output::{num, print_json, table};

#[derive(Debug, Args)]
pub struct TallyArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Fail on malformed amounts instead of counting them as zero.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct TallyFileArgs {
    /// JSON array of purchase records.
    #[arg(long)]
    pub purchases: Option<PathBuf>,

    /// JSON array of sale records.
    #[arg(long)]
    pub sales: Option<PathBuf>,

    /// Fail on malformed amounts instead of counting them as zero.
    #[arg(long)]
    pub strict: bool,
}

pub async fn run(args: TallyArgs, ctx: &Context) -> Result<()> {
    let range = args.range.range()?;
    let policy = ctx.config.tally_policy(args.strict);
    let report = ctx.db.dashboard().tally(&range, policy).await?;

    if ctx.json {
        return print_json(&report);
    }
    print_report(&report, &ctx.config);
    Ok(())
}

/// Tallies records read from JSON files.
pub fn run_file(args: &TallyFileArgs, config: &AppConfig, json: bool) -> Result<()> {
    let purchases: Vec<PurchaseRecord> = read_records(args.purchases.as_deref())?;
    let sales: Vec<SaleRecord> = read_records(args.sales.as_deref())?;
    info!(
        purchases = purchases.len(),
        sales = sales.len(),
        "Tallying records from files"
    );

    let report = tally_file_records(&purchases, &sales, config.tally_policy(args.strict))?;

    if json {
        return print_json(&report);
    }
    print_report(&report, config);
    Ok(())
}

fn tally_file_records(
    purchases: &[PurchaseRecord],
    sales: &[SaleRecord],
    policy: TallyPolicy,
) -> Result<TallyReport> {
    let report = tally_records(purchases, sales, policy)?;
    for w in &report.warnings {
        warn!(warning = %w, "Record coerced to zero");
    }
    Ok(report)
}

fn read_records<T: DeserializeOwned>(path: Option<&Path>) -> Result<Vec<T>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
    parse_records(&text).with_context(|| format!("{} is not a JSON array of records", path.display()))
}

fn parse_records<T: DeserializeOwned>(text: &str) -> serde_json::Result<Vec<T>> {
    serde_json::from_str(text)
}

fn print_report(report: &TallyReport, config: &AppConfig) {
    let s = &report.summary;

    let mut t = table(&["", "Amount"]);
    t.add_row(vec![Cell::new("Total investment"), num(config.format_money(s.total_investment))]);
    t.add_row(vec![Cell::new("Total selling"), num(config.format_money(s.total_selling))]);
    t.add_row(vec![Cell::new("Tax collected"), num(config.format_money(s.total_tax))]);
    t.add_row(vec![Cell::new("Net selling"), num(config.format_money(s.net_selling))]);
    t.add_row(vec![
        Cell::new(if s.is_loss() { "Loss" } else { "Profit" }),
        num(config.format_money(s.profit)),
    ]);
    t.add_row(vec![
        Cell::new("Profit %"),
        num(format!("{:.2}%", s.profit_percentage)),
    ]);
    println!("{t}");

    if !report.is_clean() {
        println!("{} field(s) counted as zero:", report.warnings.len());
        for w in &report.warnings {
            println!("  {w}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_records_tally() {
        let purchases: Vec<PurchaseRecord> = parse_records(
            r#"[
                {"quantity": 10, "pricePerPacket": 100, "totalAmount": 1000},
                {"totalAmount": "500.50"}
            ]"#,
        )
        .unwrap();
        let sales: Vec<SaleRecord> = parse_records(
            r#"[
                {"subtotal": 1500, "taxRate": 10, "taxAmount": 150, "totalAmount": 1650},
                {"totalAmount": 200}
            ]"#,
        )
        .unwrap();

        let report = tally_file_records(&purchases, &sales, TallyPolicy::Lenient).unwrap();
        assert_eq!(report.summary.total_investment.cents(), 150_050);
        assert_eq!(report.summary.total_selling.cents(), 185_000);
        assert_eq!(report.summary.total_tax.cents(), 15_000);
        assert_eq!(report.summary.profit.cents(), 34_950);
    }

    #[test]
    fn test_strict_file_tally_rejects_malformed() {
        let purchases: Vec<PurchaseRecord> =
            parse_records(r#"[{"totalAmount": "12abc"}]"#).unwrap();

        let lenient = tally_file_records(&purchases, &[], TallyPolicy::Lenient).unwrap();
        assert!(lenient.summary.total_investment.is_zero());
        assert_eq!(lenient.warnings.len(), 1);

        assert!(tally_file_records(&purchases, &[], TallyPolicy::Strict).is_err());
    }

    #[test]
    fn test_missing_file_means_no_records() {
        let records: Vec<SaleRecord> = read_records(None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_non_array_is_rejected() {
        assert!(parse_records::<PurchaseRecord>(r#"{"totalAmount": 1}"#).is_err());
    }
}
