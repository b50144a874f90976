//! `agency item add | list | find`

use agency_core::item::ItemDraft;
use agency_core::{Item, Page};
use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::Subcommand;
use comfy_table::Cell;
use uuid::Uuid;

use super::{Context, PageArgs};
use crate::output::{num, opt, print_json, table};

#[derive(Debug, Subcommand)]
pub enum ItemCommand {
    /// Add an inventory item. A QR payload is generated unless --qr is given.
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Use this QR payload instead of generating one.
        #[arg(long)]
        qr: Option<String>,

        /// Pieces in one packet.
        #[arg(long, default_value_t = 0)]
        pieces: i64,
    },
    /// List active items by name.
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Look up an item by the payload scanned from its label.
    Find { qr: String },
    /// Deactivate an item. Past purchases and sales keep their snapshot.
    Remove { id: String },
}

pub async fn run(cmd: ItemCommand, ctx: &Context) -> Result<()> {
    match cmd {
        ItemCommand::Add {
            name,
            description,
            qr,
            pieces,
        } => {
            let item = ItemDraft {
                name,
                description,
                qr_code: qr,
                pieces_per_packet: pieces,
            }
            .into_item(Uuid::new_v4().to_string(), &ctx.config.qr_prefix, Utc::now())?;
            ctx.db.items().insert(&item).await?;

            if ctx.json {
                return print_json(&item);
            }
            println!("Added {} with QR payload {}", item.name, item.qr_code);
            Ok(())
        }
        ItemCommand::List { page } => {
            let page: Page = page.page();
            let items = ctx.db.items().list_active(page).await?;
            if ctx.json {
                return print_json(&items);
            }
            let total = ctx.db.items().count().await?;
            print_items(&items);
            println!(
                "page {} of {} ({} active item(s))",
                page.page,
                page.total_pages(total),
                total
            );
            Ok(())
        }
        ItemCommand::Find { qr } => {
            let item = ctx
                .db
                .items()
                .get_by_qr_code(qr.trim())
                .await?
                .ok_or_else(|| anyhow!("no active item with QR code {}", qr.trim()))?;
            if ctx.json {
                return print_json(&item);
            }
            print_items(std::slice::from_ref(&item));
            Ok(())
        }
        ItemCommand::Remove { id } => {
            ctx.db.items().soft_delete(&id).await?;
            if !ctx.json {
                println!("Deactivated item {id}");
            }
            Ok(())
        }
    }
}

fn print_items(items: &[Item]) {
    let mut t = table(&["Name", "QR payload", "Pieces/packet", "Description"]);
    for item in items {
        t.add_row(vec![
            Cell::new(&item.name),
            Cell::new(&item.qr_code),
            num(item.pieces_per_packet),
            Cell::new(opt(item.description.as_deref())),
        ]);
    }
    println!("{t}");
}
