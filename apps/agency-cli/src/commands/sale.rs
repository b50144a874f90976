//! `agency sale add | list | void`
//!
//! Lines are given as `--line DESCRIPTION,QUANTITY,PRICE`. A description of
//! the form `qr:<code>` pulls the name from the inventory item with that QR
//! code and links the line to it.

use std::str::FromStr;

use agency_core::sale::{SaleDraft, SaleLineInput};
use agency_core::{Money, Sale, SaleStatus, TaxRate};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use comfy_table::Cell;
use tracing::info;

use super::{parse_tax_rate, today, Context, PageArgs, RangeArgs};
use crate::output::{num, opt, print_json, table};

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Record a sale and assign its invoice number.
    Add(SaleAddArgs),
    /// List sales, newest first.
    List {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Void a sale (kept on record, excluded from the tally).
    Void {
        /// Sale id or invoice number.
        sale: String,
    },
}

#[derive(Debug, Args)]
pub struct SaleAddArgs {
    /// A sale line: DESCRIPTION,QUANTITY,PRICE (repeatable).
    #[arg(long = "line", required = true)]
    pub lines: Vec<LineArg>,

    /// Customer id.
    #[arg(long)]
    pub customer: Option<String>,

    /// Tax rate in percent; defaults to AGENCY_TAX_RATE.
    #[arg(long, value_parser = parse_tax_rate)]
    pub tax: Option<TaxRate>,

    /// Sale date (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

/// One `--line` argument before item lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LineArg {
    pub description: String,
    pub quantity: i64,
    pub price: Money,
}

impl FromStr for LineArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split from the right so descriptions may contain commas
        let mut parts = s.rsplitn(3, ',');
        let (Some(price), Some(quantity), Some(description)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err("expected DESCRIPTION,QUANTITY,PRICE".to_string());
        };

        let quantity = quantity
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("invalid quantity {:?}", quantity.trim()))?;
        let price = Money::parse_decimal(price).map_err(|e| e.to_string())?;

        Ok(LineArg {
            description: description.trim().to_string(),
            quantity,
            price,
        })
    }
}

pub async fn run(cmd: SaleCommand, ctx: &Context) -> Result<()> {
    match cmd {
        SaleCommand::Add(args) => add(args, ctx).await,
        SaleCommand::List { range, page } => {
            let sales = ctx.db.sales().list(&range.range()?, page.page()).await?;
            if ctx.json {
                return print_json(&sales);
            }
            print_sales(&sales, ctx);
            Ok(())
        }
        SaleCommand::Void { sale } => {
            let id = resolve_sale_id(&sale, ctx).await?;
            let voided = ctx.db.sales().void(&id).await?;
            if ctx.json {
                return print_json(&voided);
            }
            println!("Voided {}", voided.invoice_number);
            Ok(())
        }
    }
}

async fn add(args: SaleAddArgs, ctx: &Context) -> Result<()> {
    let mut lines = Vec::with_capacity(args.lines.len());
    for line in args.lines {
        lines.push(resolve_line(line, ctx).await?);
    }

    let draft = SaleDraft {
        customer_id: args.customer,
        lines,
        tax_rate: args.tax.unwrap_or(ctx.config.default_tax_rate),
        sale_date: args.date.unwrap_or_else(today),
        notes: args.notes,
    };

    let (sale, _) = ctx.db.sales().record(draft).await?;

    if ctx.json {
        return print_json(&sale);
    }
    println!(
        "Recorded {} ({}): subtotal {}, tax {}, total {}",
        sale.invoice_number,
        sale.id,
        ctx.config.format_money(Money::from_cents(sale.subtotal_cents)),
        ctx.config.format_money(Money::from_cents(sale.tax_cents)),
        ctx.config.format_money(sale.total()),
    );
    Ok(())
}

async fn resolve_line(line: LineArg, ctx: &Context) -> Result<SaleLineInput> {
    let Some(code) = line.description.strip_prefix("qr:") else {
        return Ok(SaleLineInput {
            item_id: None,
            description: line.description,
            quantity: line.quantity,
            price_per_piece: line.price,
        });
    };

    let item = ctx
        .db
        .items()
        .get_by_qr_code(code)
        .await?
        .ok_or_else(|| anyhow!("no active item with QR code {code}"))?;
    info!(qr_code = %code, item = %item.name, "Resolved sale line");

    Ok(SaleLineInput {
        item_id: Some(item.id),
        description: item.name,
        quantity: line.quantity,
        price_per_piece: line.price,
    })
}

/// Accepts either a sale id or an invoice number.
pub async fn resolve_sale_id(key: &str, ctx: &Context) -> Result<String> {
    if key.starts_with("INV-") {
        let sale = ctx
            .db
            .sales()
            .get_by_invoice_number(key)
            .await?
            .ok_or_else(|| anyhow!("no sale with invoice number {key}"))?;
        return Ok(sale.id);
    }
    Ok(key.to_string())
}

fn print_sales(sales: &[Sale], ctx: &Context) {
    let mut t = table(&["Date", "Invoice", "Customer", "Status", "Subtotal", "Tax", "Total"]);
    for s in sales {
        t.add_row(vec![
            Cell::new(s.sale_date),
            Cell::new(&s.invoice_number),
            Cell::new(opt(s.customer_id.as_deref())),
            Cell::new(s.status.as_str()),
            num(ctx.config.format_money(Money::from_cents(s.subtotal_cents))),
            num(ctx.config.format_money(Money::from_cents(s.tax_cents))),
            num(ctx.config.format_money(s.total())),
        ]);
    }
    println!("{t}");

    let completed: Money = sales
        .iter()
        .filter(|s| s.status == SaleStatus::Completed)
        .map(Sale::total)
        .sum();
    println!(
        "{} sale(s), {} completed",
        sales.len(),
        ctx.config.format_money(completed)
    );
}
