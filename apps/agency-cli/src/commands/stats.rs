//! `agency stats`

use anyhow::Result;
use comfy_table::Cell;

use super::{Context, RangeArgs};
use crate::output::{num, print_json, table};

pub async fn run(args: RangeArgs, ctx: &Context) -> Result<()> {
    let stats = ctx.db.dashboard().stats(&args.range()?).await?;
    if ctx.json {
        return print_json(&stats);
    }

    let money = |m| ctx.config.format_money(m);
    let s = &stats.tally;

    let mut t = table(&["", "Value"]);
    t.add_row(vec![Cell::new("Purchases"), num(stats.purchase_count)]);
    t.add_row(vec![Cell::new("Sales"), num(stats.sale_count)]);
    t.add_row(vec![Cell::new("Active items"), num(stats.item_count)]);
    t.add_row(vec![Cell::new("Customers"), num(stats.customer_count)]);
    t.add_row(vec![Cell::new("Total investment"), num(money(s.total_investment))]);
    t.add_row(vec![Cell::new("Total selling"), num(money(s.total_selling))]);
    t.add_row(vec![Cell::new("Net selling"), num(money(s.net_selling))]);
    t.add_row(vec![Cell::new("Profit"), num(money(s.profit))]);
    t.add_row(vec![Cell::new("Profit %"), num(format!("{:.2}%", s.profit_percentage))]);
    println!("{t}");

    if !stats.warnings.is_empty() {
        println!(
            "{} stored field(s) counted as zero; run `agency tally --strict` for details",
            stats.warnings.len()
        );
    }
    Ok(())
}
