//! # Sale Repository
//!
//! Database operations for sales and sale lines.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── record() → next invoice number for the sale date               │
//! │                  → Sale { status: Completed } + lines                  │
//! │                  (one transaction)                                      │
//! │                                                                         │
//! │  2. (OPTIONAL) VOID                                                    │
//! │     └── void() → Sale { status: Voided }                               │
//! │                  row kept for the record, excluded from the tally      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use agency_core::invoice::{generate_invoice_number, invoice_number_prefix, parse_invoice_number};
use agency_core::sale::SaleDraft;
use agency_core::tally::SaleRecord;
use agency_core::{CoreError, DateRange, Page, Sale, SaleLine, SaleStatus};
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = r#"
    id, invoice_number, customer_id, status,
    subtotal_cents, tax_rate_bps, tax_cents, total_cents,
    sale_date, notes, created_at, updated_at
"#;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Validates `draft`, numbers it and stores it with its lines.
    ///
    /// The invoice sequence is read inside the same transaction as the
    /// insert, so two sales on the same day never share a number.
    pub async fn record(&self, draft: SaleDraft) -> DbResult<(Sale, Vec<SaleLine>)> {
        draft.validate()?;

        let mut tx = self.pool.begin().await?;

        let sequence = next_sequence(&mut tx, draft.sale_date).await?;
        let invoice_number = generate_invoice_number(draft.sale_date, sequence);
        let (sale, lines) = draft.into_sale(Uuid::new_v4().to_string(), invoice_number, Utc::now())?;

        insert_rows(&mut tx, &sale, &lines).await?;
        tx.commit().await?;

        info!(
            id = %sale.id,
            invoice_number = %sale.invoice_number,
            total_cents = sale.total_cents,
            "Sale recorded"
        );

        Ok((sale, lines))
    }

    /// Inserts an already-built sale and its lines in one transaction.
    pub async fn insert_with_lines(&self, sale: &Sale, lines: &[SaleLine]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        insert_rows(&mut tx, sale, lines).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its invoice number.
    pub async fn get_by_invoice_number(&self, invoice_number: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE invoice_number = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets the lines of a sale in invoice order.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT
                id, sale_id, item_id, description,
                quantity, price_per_piece_cents, line_total_cents, position
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists sales in `range` (voided ones included), newest first.
    pub async fn list(&self, range: &DateRange, page: Page) -> DbResult<Vec<Sale>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            ORDER BY sale_date DESC, invoice_number DESC
            LIMIT ?3 OFFSET ?4
            "#
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(range.from)
            .bind(range.to)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Voids a completed sale.
    ///
    /// ## Errors
    /// - `SaleNotFound` if the id doesn't exist
    /// - `InvalidSaleStatus` if the sale is already voided
    pub async fn void(&self, sale_id: &str) -> DbResult<Sale> {
        let sale = self
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if sale.status != SaleStatus::Completed {
            return Err(CoreError::InvalidSaleStatus {
                sale_id: sale_id.to_string(),
                current_status: sale.status.as_str().to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = 'voided',
                updated_at = ?2
            WHERE id = ?1 AND status = 'completed'
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (completed)", sale_id));
        }

        info!(id = %sale_id, invoice_number = %sale.invoice_number, "Sale voided");

        Ok(Sale {
            status: SaleStatus::Voided,
            updated_at: now,
            ..sale
        })
    }

    /// Counts sales in `range`, voided ones included.
    pub async fn count(&self, range: &DateRange) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sales
            WHERE (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Next free invoice sequence for `date` (1 on a fresh day).
    pub async fn next_invoice_sequence(&self, date: NaiveDate) -> DbResult<u32> {
        let mut tx = self.pool.begin().await?;
        let sequence = next_sequence(&mut tx, date).await?;
        tx.commit().await?;
        Ok(sequence)
    }

    /// Loads every completed sale in `range` as a tally record.
    pub async fn tally_inputs(&self, range: &DateRange) -> DbResult<Vec<SaleRecord>> {
        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE status = 'completed'
              AND (?1 IS NULL OR sale_date >= ?1)
              AND (?2 IS NULL OR sale_date <= ?2)
            ORDER BY sale_date, invoice_number
            "#
        );

        let rows = sqlx::query_as::<_, Sale>(&sql)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(SaleRecord::from).collect())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn next_sequence(tx: &mut Transaction<'_, Sqlite>, date: NaiveDate) -> DbResult<u32> {
    let pattern = format!("{}%", invoice_number_prefix(date));

    let numbers: Vec<String> =
        sqlx::query_scalar("SELECT invoice_number FROM sales WHERE invoice_number LIKE ?1")
            .bind(pattern)
            .fetch_all(&mut **tx)
            .await?;

    let highest = numbers
        .iter()
        .filter_map(|n| parse_invoice_number(n))
        .filter(|(day, _)| *day == date)
        .map(|(_, seq)| seq)
        .max()
        .unwrap_or(0);

    Ok(highest + 1)
}

async fn insert_rows(
    tx: &mut Transaction<'_, Sqlite>,
    sale: &Sale,
    lines: &[SaleLine],
) -> DbResult<()> {
    debug!(id = %sale.id, invoice_number = %sale.invoice_number, lines = lines.len(), "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, invoice_number, customer_id, status,
            subtotal_cents, tax_rate_bps, tax_cents, total_cents,
            sale_date, notes, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7, ?8,
            ?9, ?10, ?11, ?12
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.invoice_number)
    .bind(&sale.customer_id)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.tax_rate_bps)
    .bind(sale.tax_cents)
    .bind(sale.total_cents)
    .bind(sale.sale_date)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(&mut **tx)
    .await?;

    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                id, sale_id, item_id, description,
                quantity, price_per_piece_cents, line_total_cents, position
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8
            )
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.item_id)
        .bind(&line.description)
        .bind(line.quantity)
        .bind(line.price_per_piece_cents)
        .bind(line.line_total_cents)
        .bind(line.position)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use agency_core::sale::SaleLineInput;
    use agency_core::{Money, TaxRate};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn draft(date: NaiveDate, qty: i64, cents: i64) -> SaleDraft {
        SaleDraft {
            customer_id: None,
            lines: vec![
                SaleLineInput {
                    item_id: None,
                    description: "Green Tea".to_string(),
                    quantity: qty,
                    price_per_piece: Money::from_cents(cents),
                },
                SaleLineInput {
                    item_id: None,
                    description: "Mug".to_string(),
                    quantity: 1,
                    price_per_piece: Money::from_cents(1000),
                },
            ],
            tax_rate: TaxRate::from_bps(1000),
            sale_date: date,
            notes: None,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_record_numbers_invoices_per_day() {
        let db = db().await;
        let repo = db.sales();

        let (first, _) = repo.record(draft(day(3), 2, 500)).await.unwrap();
        let (second, _) = repo.record(draft(day(3), 1, 500)).await.unwrap();
        let (other_day, _) = repo.record(draft(day(4), 1, 500)).await.unwrap();

        assert_eq!(first.invoice_number, "INV-20261003-0001");
        assert_eq!(second.invoice_number, "INV-20261003-0002");
        assert_eq!(other_day.invoice_number, "INV-20261004-0001");
        assert_eq!(repo.next_invoice_sequence(day(3)).await.unwrap(), 3);
        assert_eq!(repo.next_invoice_sequence(day(5)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_persists_lines_and_totals() {
        let db = db().await;
        let repo = db.sales();

        let (sale, _) = repo.record(draft(day(3), 2, 500)).await.unwrap();
        let stored = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        let lines = repo.get_lines(&sale.id).await.unwrap();

        assert_eq!(stored, sale);
        assert_eq!(stored.subtotal_cents, 2000);
        assert_eq!(stored.tax_cents, 200);
        assert_eq!(stored.total_cents, 2200);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].description, "Green Tea");
        assert_eq!(lines[1].position, 2);

        let by_number = repo
            .get_by_invoice_number(&sale.invoice_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, sale.id);
    }

    #[tokio::test]
    async fn test_insert_with_lines_is_atomic() {
        let db = db().await;
        let repo = db.sales();

        let (sale, lines) = draft(day(7), 2, 500)
            .into_sale(
                Uuid::new_v4().to_string(),
                "INV-20261007-0042".to_string(),
                Utc::now(),
            )
            .unwrap();
        repo.insert_with_lines(&sale, &lines).await.unwrap();

        assert_eq!(repo.get_by_id(&sale.id).await.unwrap(), Some(sale.clone()));
        assert_eq!(repo.get_lines(&sale.id).await.unwrap(), lines);
        assert_eq!(repo.next_invoice_sequence(day(7)).await.unwrap(), 43);

        // Same invoice number: neither the sale nor its lines are kept
        let (clash, clash_lines) = draft(day(7), 1, 100)
            .into_sale(
                Uuid::new_v4().to_string(),
                sale.invoice_number.clone(),
                Utc::now(),
            )
            .unwrap();
        let err = repo.insert_with_lines(&clash, &clash_lines).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(repo.get_by_id(&clash.id).await.unwrap().is_none());
        assert!(repo.get_lines(&clash.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_writes_nothing() {
        let db = db().await;
        let repo = db.sales();

        let err = repo.record(draft(day(3), 0, 500)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert_eq!(repo.count(&DateRange::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_void_excludes_from_tally_inputs() {
        let db = db().await;
        let repo = db.sales();

        let (kept, _) = repo.record(draft(day(3), 2, 500)).await.unwrap();
        let (voided, _) = repo.record(draft(day(3), 1, 500)).await.unwrap();

        let after = repo.void(&voided.id).await.unwrap();
        assert_eq!(after.status, SaleStatus::Voided);

        let again = repo.void(&voided.id).await.unwrap_err();
        assert!(matches!(
            again,
            DbError::Domain(CoreError::InvalidSaleStatus { .. })
        ));
        assert!(repo.void("missing").await.unwrap_err().is_not_found());

        let records = repo.tally_inputs(&DateRange::all()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].total_amount.to_money().unwrap(),
            Money::from_cents(kept.total_cents)
        );
        assert_eq!(repo.count(&DateRange::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_by_range() {
        let db = db().await;
        let repo = db.sales();
        for d in [1, 2, 3] {
            repo.record(draft(day(d), 1, 100)).await.unwrap();
        }

        let range = DateRange::new(Some(day(2)), None).unwrap();
        let listed = repo.list(&range, Page::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].sale_date, day(3));
    }

    #[tokio::test]
    async fn test_unknown_customer_is_rejected() {
        let db = db().await;
        let mut d = draft(day(3), 1, 100);
        d.customer_id = Some(Uuid::new_v4().to_string());

        let err = db.sales().record(d).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
