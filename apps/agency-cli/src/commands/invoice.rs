//! `agency invoice <sale>`
//!
//! Renders the invoice of a stored sale. The totals are re-checked against
//! the lines before anything is printed.

use agency_core::invoice::{Invoice, Issuer};
use anyhow::{anyhow, Result};
use clap::Args;
use comfy_table::Cell;

use super::sale::resolve_sale_id;
use super::Context;
use crate::config::AppConfig;
use crate::output::{num, print_json, table};

#[derive(Debug, Args)]
pub struct InvoiceArgs {
    /// Sale id or invoice number.
    pub sale: String,
}

pub async fn run(args: InvoiceArgs, ctx: &Context) -> Result<()> {
    let id = resolve_sale_id(&args.sale, ctx).await?;

    let sales = ctx.db.sales();
    let sale = sales
        .get_by_id(&id)
        .await?
        .ok_or_else(|| anyhow!("no sale with id {id}"))?;
    let lines = sales.get_lines(&sale.id).await?;

    let customer = match &sale.customer_id {
        Some(customer_id) => ctx.db.customers().get_by_id(customer_id).await?,
        None => None,
    };

    let invoice = Invoice::build(&sale, &lines, customer.as_ref(), issuer(&ctx.config));
    invoice.verify()?;

    if ctx.json {
        return print_json(&invoice);
    }
    print_invoice(&invoice, &ctx.config);
    Ok(())
}

fn issuer(config: &AppConfig) -> Issuer {
    Issuer {
        name: config.agency_name.clone(),
        address: config.agency_address.clone(),
        currency_symbol: config.currency_symbol.clone(),
    }
}

fn print_invoice(invoice: &Invoice, config: &AppConfig) {
    println!("{}", invoice.issuer.name);
    for line in &invoice.issuer.address {
        println!("{line}");
    }
    println!();
    println!("Invoice {}    Date {}", invoice.invoice_number, invoice.issue_date);
    if invoice.voided {
        println!("*** VOIDED ***");
    }

    if let Some(bill_to) = &invoice.bill_to {
        println!();
        println!("Bill to: {}", bill_to.name);
        for detail in [&bill_to.address, &bill_to.phone, &bill_to.email]
            .into_iter()
            .flatten()
        {
            println!("         {detail}");
        }
    }
    println!();

    let mut t = table(&["#", "Description", "Qty", "Unit price", "Amount"]);
    for line in &invoice.lines {
        t.add_row(vec![
            num(line.position),
            Cell::new(&line.description),
            num(line.quantity),
            num(config.format_money(line.unit_price)),
            num(config.format_money(line.line_total)),
        ]);
    }
    println!("{t}");

    println!("{:>24}  {}", "Subtotal", config.format_money(invoice.subtotal));
    println!(
        "{:>24}  {}",
        format!("Tax ({}%)", invoice.tax_rate.percentage()),
        config.format_money(invoice.tax)
    );
    println!("{:>24}  {}", "Total", config.format_money(invoice.total));
}
