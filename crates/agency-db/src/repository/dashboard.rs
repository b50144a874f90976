//! # Dashboard Repository
//!
//! Read-only aggregates for the overview screen.
//!
//! ```text
//! purchases.tally_inputs(range) ──┐
//!                                 ├──► agency_core::tally_records ──► TallyReport
//! sales.tally_inputs(range) ──────┘
//!
//! COUNT(*) per table ─────────────────────────────────────────────► counts
//! ```
//!
//! Totals are summed by the core tally, not by SQL `SUM`, so the stored
//! books and a tally over exported JSON can never disagree.

use agency_core::tally::CoercionWarning;
use agency_core::{tally_records, DateRange, TallyPolicy, TallyReport, TallySummary};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::repository::customer::CustomerRepository;
use crate::repository::item::ItemRepository;
use crate::repository::purchase::PurchaseRepository;
use crate::repository::sale::SaleRepository;

/// Overview numbers for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub tally: TallySummary,
    pub warnings: Vec<CoercionWarning>,
    /// Purchases in range.
    pub purchase_count: i64,
    /// Sales in range, voided ones included.
    pub sale_count: i64,
    /// Active items (not date-bound).
    pub item_count: i64,
    /// All customers (not date-bound).
    pub customer_count: i64,
}

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Tallies stored purchases against completed sales in `range`.
    pub async fn tally(&self, range: &DateRange, policy: TallyPolicy) -> DbResult<TallyReport> {
        let purchases = PurchaseRepository::new(self.pool.clone())
            .tally_inputs(range)
            .await?;
        let sales = SaleRepository::new(self.pool.clone())
            .tally_inputs(range)
            .await?;

        debug!(
            purchases = purchases.len(),
            sales = sales.len(),
            ?policy,
            "Computing tally"
        );

        let report = tally_records(&purchases, &sales, policy)?;
        for w in &report.warnings {
            warn!(warning = %w, "Stored record coerced to zero");
        }

        Ok(report)
    }

    /// Tally plus record counts for `range`.
    pub async fn stats(&self, range: &DateRange) -> DbResult<DashboardStats> {
        let report = self.tally(range, TallyPolicy::Lenient).await?;

        let purchase_count = PurchaseRepository::new(self.pool.clone()).count(range).await?;
        let sale_count = SaleRepository::new(self.pool.clone()).count(range).await?;
        let item_count = ItemRepository::new(self.pool.clone()).count().await?;
        let customer_count = CustomerRepository::new(self.pool.clone()).count().await?;

        Ok(DashboardStats {
            tally: report.summary,
            warnings: report.warnings,
            purchase_count,
            sale_count,
            item_count,
            customer_count,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use agency_core::purchase::PurchaseDraft;
    use agency_core::sale::{SaleDraft, SaleLineInput};
    use agency_core::{Money, TaxRate};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // 10 packets × 100.00 on the 1st, 5 × 20.00 on the 20th
        for (d, qty, cents) in [(1, 10, 10_000), (20, 5, 2_000)] {
            let p = PurchaseDraft {
                item_name: "Green Tea".to_string(),
                item_id: None,
                supplier: None,
                quantity: qty,
                price_per_packet: Money::from_cents(cents),
                pieces_per_packet: 10,
                purchase_date: day(d),
                notes: None,
            }
            .into_purchase(Uuid::new_v4().to_string(), Utc::now())
            .unwrap();
            db.purchases().insert(&p).await.unwrap();
        }

        // Sales of 1000.00 and 200.00 before tax at 10%
        for (d, cents) in [(2, 100_000), (21, 20_000)] {
            db.sales()
                .record(SaleDraft {
                    customer_id: None,
                    lines: vec![SaleLineInput {
                        item_id: None,
                        description: "Green Tea".to_string(),
                        quantity: 1,
                        price_per_piece: Money::from_cents(cents),
                    }],
                    tax_rate: TaxRate::from_bps(1000),
                    sale_date: day(d),
                    notes: None,
                })
                .await
                .unwrap();
        }

        db
    }

    #[tokio::test]
    async fn test_empty_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stats = db.dashboard().stats(&DateRange::all()).await.unwrap();

        assert_eq!(stats.tally, TallySummary::default());
        assert!(stats.warnings.is_empty());
        assert_eq!(stats.purchase_count, 0);
        assert_eq!(stats.customer_count, 0);
    }

    #[tokio::test]
    async fn test_stats_over_all_records() {
        let db = seeded().await;
        let stats = db.dashboard().stats(&DateRange::all()).await.unwrap();

        assert_eq!(stats.tally.total_investment, Money::from_cents(110_000));
        assert_eq!(stats.tally.total_selling, Money::from_cents(132_000));
        assert_eq!(stats.tally.total_tax, Money::from_cents(12_000));
        assert_eq!(stats.tally.net_selling, Money::from_cents(120_000));
        assert_eq!(stats.tally.profit, Money::from_cents(22_000));
        assert_eq!(stats.tally.profit_percentage, 20.0);
        assert_eq!(stats.purchase_count, 2);
        assert_eq!(stats.sale_count, 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["purchaseCount"], 2);
    }

    #[tokio::test]
    async fn test_range_and_voids() {
        let db = seeded().await;
        let range = DateRange::new(Some(day(1)), Some(day(10))).unwrap();

        let report = db
            .dashboard()
            .tally(&range, TallyPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(report.summary.total_investment, Money::from_cents(100_000));
        assert_eq!(report.summary.total_selling, Money::from_cents(110_000));
        assert!(report.is_clean());

        let listed = db
            .sales()
            .list(&range, agency_core::Page::default())
            .await
            .unwrap();
        db.sales().void(&listed[0].id).await.unwrap();

        let stats = db.dashboard().stats(&range).await.unwrap();
        assert!(stats.tally.total_selling.is_zero());
        assert!(stats.tally.is_loss());
        assert_eq!(stats.sale_count, 1);
    }
}
