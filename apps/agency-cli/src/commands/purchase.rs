//! `agency purchase add | list`

use agency_core::purchase::PurchaseDraft;
use agency_core::{Money, Purchase};
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use comfy_table::Cell;
use uuid::Uuid;

use super::{parse_money, today, Context, PageArgs, RangeArgs};
use crate::output::{num, opt, print_json, table};

#[derive(Debug, Subcommand)]
pub enum PurchaseCommand {
    /// Record a purchase.
    Add(PurchaseAddArgs),
    /// List purchases, newest first.
    List {
        #[command(flatten)]
        range: RangeArgs,
        #[command(flatten)]
        page: PageArgs,
    },
}

#[derive(Debug, Args)]
pub struct PurchaseAddArgs {
    /// Product name as written on the buying slip.
    #[arg(long, required_unless_present = "qr")]
    pub item: Option<String>,

    /// Link the purchase to the inventory item with this QR code.
    #[arg(long)]
    pub qr: Option<String>,

    #[arg(long)]
    pub supplier: Option<String>,

    /// Packets bought.
    #[arg(long)]
    pub quantity: i64,

    /// Price of one packet, e.g. 120.00.
    #[arg(long, value_parser = parse_money)]
    pub price: Money,

    /// Pieces in one packet (defaults to the linked item's, else 0).
    #[arg(long)]
    pub pieces: Option<i64>,

    /// Purchase date (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn run(cmd: PurchaseCommand, ctx: &Context) -> Result<()> {
    match cmd {
        PurchaseCommand::Add(args) => add(args, ctx).await,
        PurchaseCommand::List { range, page } => {
            let purchases = ctx.db.purchases().list(&range.range()?, page.page()).await?;
            if ctx.json {
                return print_json(&purchases);
            }
            print_purchases(&purchases, ctx);
            Ok(())
        }
    }
}

async fn add(args: PurchaseAddArgs, ctx: &Context) -> Result<()> {
    let linked = match &args.qr {
        Some(code) => Some(
            ctx.db
                .items()
                .get_by_qr_code(code)
                .await?
                .ok_or_else(|| anyhow!("no active item with QR code {code}"))?,
        ),
        None => None,
    };

    let item_name = match (args.item, &linked) {
        (Some(name), _) => name,
        (None, Some(item)) => item.name.clone(),
        (None, None) => return Err(anyhow!("--item or --qr is required")),
    };

    let draft = PurchaseDraft {
        item_name,
        item_id: linked.as_ref().map(|i| i.id.clone()),
        supplier: args.supplier,
        quantity: args.quantity,
        price_per_packet: args.price,
        pieces_per_packet: args
            .pieces
            .or_else(|| linked.as_ref().map(|i| i.pieces_per_packet))
            .unwrap_or(0),
        purchase_date: args.date.unwrap_or_else(today),
        notes: args.notes,
    };

    let purchase = draft.into_purchase(Uuid::new_v4().to_string(), Utc::now())?;
    ctx.db.purchases().insert(&purchase).await?;

    if ctx.json {
        return print_json(&purchase);
    }
    println!(
        "Recorded purchase {}: {} × {} = {}",
        purchase.id,
        purchase.quantity,
        ctx.config.format_money(Money::from_cents(purchase.price_per_packet_cents)),
        ctx.config.format_money(purchase.total_amount()),
    );
    Ok(())
}

fn print_purchases(purchases: &[Purchase], ctx: &Context) {
    let mut t = table(&[
        "Date", "Item", "Supplier", "Packets", "Per packet", "Pieces", "Per piece", "Total",
    ]);
    for p in purchases {
        t.add_row(vec![
            Cell::new(p.purchase_date),
            Cell::new(&p.item_name),
            Cell::new(opt(p.supplier.as_deref())),
            num(p.quantity),
            num(ctx.config.format_money(Money::from_cents(p.price_per_packet_cents))),
            num(p.total_pieces),
            num(ctx.config.format_money(Money::from_cents(p.price_per_piece_cents))),
            num(ctx.config.format_money(p.total_amount())),
        ]);
    }
    println!("{t}");

    let total: Money = purchases.iter().map(Purchase::total_amount).sum();
    println!("{} purchase(s), {}", purchases.len(), ctx.config.format_money(total));
}
