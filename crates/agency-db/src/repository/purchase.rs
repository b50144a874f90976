//! # Purchase Repository
//!
//! Database operations for purchases (stock bought from suppliers).
//!
//! Rows arrive here fully derived by [`agency_core::purchase::PurchaseDraft`];
//! this module never recomputes totals.

use agency_core::tally::PurchaseRecord;
use agency_core::{DateRange, Page, Purchase};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const PURCHASE_COLUMNS: &str = r#"
    id, item_name, item_id, supplier,
    quantity, price_per_packet_cents, pieces_per_packet,
    total_pieces, price_per_piece_cents, total_amount_cents,
    purchase_date, notes, created_at, updated_at
"#;

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Inserts a new purchase.
    pub async fn insert(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, item = %purchase.item_name, "Inserting purchase");

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, item_name, item_id, supplier,
                quantity, price_per_packet_cents, pieces_per_packet,
                total_pieces, price_per_piece_cents, total_amount_cents,
                purchase_date, notes, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.item_name)
        .bind(&purchase.item_id)
        .bind(&purchase.supplier)
        .bind(purchase.quantity)
        .bind(purchase.price_per_packet_cents)
        .bind(purchase.pieces_per_packet)
        .bind(purchase.total_pieces)
        .bind(purchase.price_per_piece_cents)
        .bind(purchase.total_amount_cents)
        .bind(purchase.purchase_date)
        .bind(&purchase.notes)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1");
        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(purchase)
    }

    /// Lists purchases in `range`, newest first.
    pub async fn list(&self, range: &DateRange, page: Page) -> DbResult<Vec<Purchase>> {
        let sql = format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE (?1 IS NULL OR purchase_date >= ?1)
              AND (?2 IS NULL OR purchase_date <= ?2)
            ORDER BY purchase_date DESC, created_at DESC
            LIMIT ?3 OFFSET ?4
            "#
        );

        let purchases = sqlx::query_as::<_, Purchase>(&sql)
            .bind(range.from)
            .bind(range.to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(purchases)
    }

    /// Overwrites an existing purchase (explicit edit).
    pub async fn update(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(id = %purchase.id, "Updating purchase");

        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                item_name = ?2,
                item_id = ?3,
                supplier = ?4,
                quantity = ?5,
                price_per_packet_cents = ?6,
                pieces_per_packet = ?7,
                total_pieces = ?8,
                price_per_piece_cents = ?9,
                total_amount_cents = ?10,
                purchase_date = ?11,
                notes = ?12,
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.item_name)
        .bind(&purchase.item_id)
        .bind(&purchase.supplier)
        .bind(purchase.quantity)
        .bind(purchase.price_per_packet_cents)
        .bind(purchase.pieces_per_packet)
        .bind(purchase.total_pieces)
        .bind(purchase.price_per_piece_cents)
        .bind(purchase.total_amount_cents)
        .bind(purchase.purchase_date)
        .bind(&purchase.notes)
        .bind(purchase.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", &purchase.id));
        }

        Ok(())
    }

    /// Deletes a purchase.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting purchase");

        let result = sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }

        Ok(())
    }

    /// Counts purchases in `range`.
    pub async fn count(&self, range: &DateRange) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM purchases
            WHERE (?1 IS NULL OR purchase_date >= ?1)
              AND (?2 IS NULL OR purchase_date <= ?2)
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Loads every purchase in `range` as a tally record, oldest first.
    pub async fn tally_inputs(&self, range: &DateRange) -> DbResult<Vec<PurchaseRecord>> {
        let sql = format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE (?1 IS NULL OR purchase_date >= ?1)
              AND (?2 IS NULL OR purchase_date <= ?2)
            ORDER BY purchase_date, created_at
            "#
        );

        let rows = sqlx::query_as::<_, Purchase>(&sql)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(PurchaseRecord::from).collect())
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
    use agency_core::Money;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn draft(date: NaiveDate, packets: i64, cents: i64) -> PurchaseDraft {
        PurchaseDraft {
            item_name: "Green Tea 200g".to_string(),
            item_id: None,
            supplier: Some("Wholesale Co".to_string()),
            quantity: packets,
            price_per_packet: Money::from_cents(cents),
            pieces_per_packet: 12,
            purchase_date: date,
            notes: None,
        }
    }

    async fn seeded() -> (Database, Vec<Purchase>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.purchases();
        let mut stored = Vec::new();
        for (d, packets, cents) in [(1, 2, 1000), (5, 1, 2500), (9, 4, 300)] {
            let p = draft(day(d), packets, cents)
                .into_purchase(Uuid::new_v4().to_string(), Utc::now())
                .unwrap();
            repo.insert(&p).await.unwrap();
            stored.push(p);
        }
        (db, stored)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, stored) = seeded().await;
        let found = db.purchases().get_by_id(&stored[0].id).await.unwrap().unwrap();

        assert_eq!(found.item_name, "Green Tea 200g");
        assert_eq!(found.purchase_date, day(1));
        assert_eq!(found.total_amount_cents, 2000);
        assert_eq!(found.total_pieces, 24);
        assert!(db.purchases().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_date_and_pages() {
        let (db, _) = seeded().await;
        let repo = db.purchases();

        let all = repo.list(&DateRange::all(), Page::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].purchase_date, day(9));

        let range = DateRange::new(Some(day(2)), Some(day(9))).unwrap();
        let ranged = repo.list(&range, Page::default()).await.unwrap();
        assert_eq!(ranged.len(), 2);
        assert_eq!(repo.count(&range).await.unwrap(), 2);

        let second = repo.list(&DateRange::all(), Page::new(2, 2)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].purchase_date, day(1));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, stored) = seeded().await;
        let repo = db.purchases();

        let edited = draft(day(1), 10, 1000)
            .apply_to(&stored[0], Utc::now())
            .unwrap();
        repo.update(&edited).await.unwrap();
        let found = repo.get_by_id(&stored[0].id).await.unwrap().unwrap();
        assert_eq!(found.total_amount_cents, 10_000);

        repo.delete(&stored[0].id).await.unwrap();
        assert!(repo.get_by_id(&stored[0].id).await.unwrap().is_none());
        assert!(repo.delete(&stored[0].id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_tally_inputs_carry_totals() {
        let (db, _) = seeded().await;
        let records = db.purchases().tally_inputs(&DateRange::all()).await.unwrap();

        let totals: Vec<Money> = records
            .iter()
            .map(|r| r.total_amount.to_money().unwrap())
            .collect();
        assert_eq!(
            totals,
            vec![
                Money::from_cents(2000),
                Money::from_cents(2500),
                Money::from_cents(1200)
            ]
        );
    }
}
