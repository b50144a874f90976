//! `agency seed`
//!
//! Fills an empty database with sample items, customers, purchases and
//! sales. Values are derived from a running seed so repeated runs produce
//! the same books (QR payloads and ids aside).
//!
//! ```text
//! items ──► one purchase each (restock) ──► sales of 1-3 items per sale
//! ```

use agency_core::item::ItemDraft;
use agency_core::purchase::PurchaseDraft;
use agency_core::sale::{SaleDraft, SaleLineInput};
use agency_core::{Customer, Item, Money};
use anyhow::Result;
use chrono::{Days, NaiveDate, Utc};
use clap::Args;
use tracing::{info, warn};
use uuid::Uuid;

use super::{today, Context};

/// Products by supplier, for realistic sample data.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "Hill Estates",
        &[
            "Green Tea 200g",
            "Black Tea 500g",
            "Jasmine Tea 100g",
            "Kashmiri Chai 250g",
            "Mint Tea 100g",
        ],
    ),
    (
        "Spice Bazaar",
        &[
            "Red Chilli Powder 200g",
            "Turmeric 200g",
            "Garam Masala 100g",
            "Cumin Seeds 250g",
            "Black Pepper 100g",
        ],
    ),
    (
        "Harbour Foods",
        &[
            "Basmati Rice 5kg",
            "Chickpeas 1kg",
            "Red Lentils 1kg",
            "Sugar 1kg",
            "Cooking Oil 3L",
        ],
    ),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ahmed General Store", "0300-1234567"),
    ("City Mart", "0321-7654321"),
    ("Noor Traders", "0333-5550101"),
    ("Sunrise Cafe", "0345-8080808"),
];

/// Sale days are spread over this many days before today.
const SPREAD_DAYS: usize = 30;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Number of sales to generate.
    #[arg(long, short, default_value_t = 50)]
    pub count: usize,
}

pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let existing = ctx.db.items().count().await?;
    if existing > 0 {
        warn!(items = existing, "Database already has items, skipping seed");
        println!("Database already has {existing} item(s); skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let now = Utc::now();
    let today = today();

    // Items, each restocked once
    let mut stock: Vec<(Item, Money)> = Vec::new();
    for (supplier_idx, (supplier, products)) in CATALOG.iter().enumerate() {
        for (product_idx, name) in products.iter().enumerate() {
            let seed = supplier_idx * 100 + product_idx;
            let pieces = 6 + (seed % 4) as i64 * 6;

            let item = ItemDraft {
                name: name.to_string(),
                description: Some(format!("Supplied by {supplier}")),
                qr_code: None,
                pieces_per_packet: pieces,
            }
            .into_item(Uuid::new_v4().to_string(), &ctx.config.qr_prefix, now)?;
            ctx.db.items().insert(&item).await?;

            let packet_price = packet_price(seed);
            let purchase = PurchaseDraft {
                item_name: item.name.clone(),
                item_id: Some(item.id.clone()),
                supplier: Some(supplier.to_string()),
                quantity: 5 + (seed % 11) as i64,
                price_per_packet: packet_price,
                pieces_per_packet: pieces,
                purchase_date: days_before(today, SPREAD_DAYS),
                notes: None,
            }
            .into_purchase(Uuid::new_v4().to_string(), now)?;
            ctx.db.purchases().insert(&purchase).await?;

            stock.push((item, selling_price(packet_price, pieces, seed)));
        }
    }
    info!(items = stock.len(), "Seeded items and purchases");

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, phone) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        ctx.db.customers().insert(&customer).await?;
        customers.push(customer);
    }

    let mut recorded = 0;
    for seed in 0..args.count {
        let draft = sale_draft(seed, &stock, &customers, ctx, today);
        match ctx.db.sales().record(draft).await {
            Ok(_) => recorded += 1,
            Err(e) => warn!(seed, error = %e, "Failed to record sample sale"),
        }
    }

    let elapsed = start.elapsed();
    info!(sales = recorded, ?elapsed, "Seed complete");
    println!(
        "Seeded {} item(s), {} customer(s) and {} sale(s) in {:?}",
        stock.len(),
        customers.len(),
        recorded,
        elapsed
    );
    Ok(())
}

/// Packet price: 50.00 to 129.90.
fn packet_price(seed: usize) -> Money {
    Money::from_cents(5_000 + ((seed * 17) % 800) as i64 * 10)
}

/// Per-piece price with a 20-39% markup over the per-piece cost.
fn selling_price(packet_price: Money, pieces: i64, seed: usize) -> Money {
    let markup_pct = 120 + (seed % 20) as i64;
    (packet_price * markup_pct).divide_rounded(100 * pieces)
}

fn sale_draft(
    seed: usize,
    stock: &[(Item, Money)],
    customers: &[Customer],
    ctx: &Context,
    today: NaiveDate,
) -> SaleDraft {
    let line_count = 1 + seed % 3;
    let lines = (0..line_count)
        .map(|i| {
            let (item, price) = &stock[(seed * 7 + i * 3) % stock.len()];
            SaleLineInput {
                item_id: Some(item.id.clone()),
                description: item.name.clone(),
                quantity: 1 + ((seed + i) % 12) as i64,
                price_per_piece: *price,
            }
        })
        .collect();

    // Every fourth sale is a walk-in
    let customer_id = (seed % 4 != 0).then(|| customers[seed % customers.len()].id.clone());

    SaleDraft {
        customer_id,
        lines,
        tax_rate: ctx.config.default_tax_rate,
        sale_date: days_before(today, seed % SPREAD_DAYS),
        notes: None,
    }
}

fn days_before(day: NaiveDate, days: usize) -> NaiveDate {
    day.checked_sub_days(Days::new(days as u64)).unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prices_are_deterministic() {
        assert_eq!(packet_price(0).cents(), 5_000);
        assert_eq!(packet_price(1).cents(), 5_170);
        assert_eq!(packet_price(3), packet_price(3));
    }

    #[test]
    fn test_selling_price_has_markup() {
        // 60.00 per packet of 12 is 5.00 per piece; 20% markup is 6.00
        let price = selling_price(Money::from_cents(6_000), 12, 0);
        assert_eq!(price.cents(), 600);
    }

    #[test]
    fn test_days_before() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(days_before(day, 0), day);
        assert_eq!(days_before(day, 18), NaiveDate::from_ymd_opt(2026, 9, 30).unwrap());
    }
}
