//! # Commands
//!
//! One module per subcommand. Each exposes its clap argument types and an
//! async `run` taking the shared [`Context`].
//!
//! ```text
//! commands/
//! ├── purchase.rs   purchase add | list
//! ├── sale.rs       sale add | list | void
//! ├── item.rs       item add | list | find
//! ├── customer.rs   customer add | list
//! ├── invoice.rs    invoice <sale>
//! ├── tally.rs      tally, tally-file
//! ├── stats.rs      stats
//! └── seed.rs       seed
//! ```

pub mod customer;
pub mod invoice;
pub mod item;
pub mod purchase;
pub mod sale;
pub mod seed;
pub mod stats;
pub mod tally;

use agency_core::{DateRange, Money, Page, TaxRate};
use agency_db::Database;
use chrono::NaiveDate;
use clap::Args;

use crate::config::AppConfig;

/// Everything a command needs.
pub struct Context {
    pub db: Database,
    pub config: AppConfig,
    pub json: bool,
}

/// `--from` / `--to` date filter.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    pub fn range(&self) -> anyhow::Result<DateRange> {
        Ok(DateRange::new(self.from, self.to)?)
    }
}

/// `--page` / `--per-page`.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 20)]
    pub per_page: u32,
}

impl PageArgs {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.per_page)
    }
}

/// clap value parser for amounts such as `12.50`.
pub fn parse_money(input: &str) -> Result<Money, String> {
    Money::parse_decimal(input).map_err(|e| e.to_string())
}

/// clap value parser for tax rates in percent, e.g. `17` or `8.25`.
pub fn parse_tax_rate(input: &str) -> Result<TaxRate, String> {
    TaxRate::parse_percentage(input).map_err(|e| e.to_string())
}

/// Today in local time, the default for business dates.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_money("12.5").unwrap().cents(), 1250);
        assert!(parse_money("twelve").is_err());
        assert_eq!(parse_tax_rate("17").unwrap().bps(), 1700);
        assert!(parse_tax_rate("170").is_err());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let args = RangeArgs {
            from: NaiveDate::from_ymd_opt(2026, 10, 2),
            to: NaiveDate::from_ymd_opt(2026, 10, 1),
        };
        assert!(args.range().is_err());
    }
}
