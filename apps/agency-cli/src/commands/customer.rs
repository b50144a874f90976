//! `agency customer add | list`

use agency_core::Customer;
use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use comfy_table::Cell;
use uuid::Uuid;

use super::{Context, PageArgs};
use crate::output::{opt, print_json, table};

/// Search results are capped at this many rows.
const SEARCH_LIMIT: i64 = 50;

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// Add a customer.
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },
    /// List customers, or search by name, phone or email.
    List {
        #[arg(long)]
        search: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },
}

pub async fn run(cmd: CustomerCommand, ctx: &Context) -> Result<()> {
    match cmd {
        CustomerCommand::Add {
            name,
            phone,
            email,
            address,
        } => {
            let now = Utc::now();
            let customer = Customer {
                id: Uuid::new_v4().to_string(),
                name: name.trim().to_string(),
                phone: non_empty(phone),
                email: non_empty(email),
                address: non_empty(address),
                created_at: now,
                updated_at: now,
            };
            ctx.db.customers().insert(&customer).await?;

            if ctx.json {
                return print_json(&customer);
            }
            println!("Added customer {} ({})", customer.name, customer.id);
            Ok(())
        }
        CustomerCommand::List { search, page } => {
            let customers = match search {
                Some(query) => ctx.db.customers().search(&query, SEARCH_LIMIT).await?,
                None => ctx.db.customers().list(page.page()).await?,
            };
            if ctx.json {
                return print_json(&customers);
            }

            let mut t = table(&["Id", "Name", "Phone", "Email", "Address"]);
            for c in &customers {
                t.add_row(vec![
                    Cell::new(&c.id),
                    Cell::new(&c.name),
                    Cell::new(opt(c.phone.as_deref())),
                    Cell::new(opt(c.email.as_deref())),
                    Cell::new(opt(c.address.as_deref())),
                ]);
            }
            println!("{t}");
            Ok(())
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
