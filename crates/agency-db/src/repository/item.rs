//! # Item Repository
//!
//! Inventory items and their QR payloads.
//!
//! Items are soft-deleted: `is_active = 0` hides them from lists and QR
//! lookups, while purchases and sale lines that reference them stay intact.

use agency_core::{Item, Page};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const ITEM_COLUMNS: &str = r#"
    id, name, description, qr_code, pieces_per_packet,
    is_active, created_at, updated_at
"#;

/// Repository for inventory item operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Inserts a new item.
    ///
    /// ## Errors
    /// `UniqueViolation` when another item already carries the QR code.
    pub async fn insert(&self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, qr_code = %item.qr_code, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, description, qr_code, pieces_per_packet,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.qr_code)
        .bind(item.pieces_per_packet)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| qr_conflict(e.into(), &item.qr_code))?;

        Ok(())
    }

    /// Gets an item by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Looks up an active item by the payload scanned from its label.
    pub async fn get_by_qr_code(&self, qr_code: &str) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE qr_code = ?1 AND is_active = 1");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(qr_code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Lists active items by name.
    pub async fn list_active(&self, page: Page) -> DbResult<Vec<Item>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE is_active = 1
            ORDER BY name COLLATE NOCASE, created_at
            LIMIT ?1 OFFSET ?2
            "#
        );

        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Updates name, description, QR code and pieces per packet.
    pub async fn update(&self, item: &Item) -> DbResult<()> {
        debug!(id = %item.id, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                name = ?2,
                description = ?3,
                qr_code = ?4,
                pieces_per_packet = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.qr_code)
        .bind(item.pieces_per_packet)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| qr_conflict(e.into(), &item.qr_code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", &item.id));
        }

        Ok(())
    }

    /// Hides an item from lists and QR lookups.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating item");

        let result = sqlx::query(
            "UPDATE items SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Counts active items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Names the QR code in a unique-constraint error.
fn qr_conflict(err: DbError, qr_code: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field.ends_with("qr_code") => {
            DbError::duplicate("qr_code", qr_code)
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use agency_core::item::ItemDraft;
    use uuid::Uuid;

    fn item(name: &str, qr: Option<&str>) -> Item {
        ItemDraft {
            name: name.to_string(),
            description: None,
            qr_code: qr.map(str::to_string),
            pieces_per_packet: 12,
        }
        .into_item(Uuid::new_v4().to_string(), "AGY", Utc::now())
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_qr() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let tea = item("Green Tea", None);
        repo.insert(&tea).await.unwrap();

        let found = repo.get_by_qr_code(&tea.qr_code).await.unwrap().unwrap();
        assert_eq!(found.id, tea.id);
        assert!(found.is_active);
        assert!(repo.get_by_qr_code("NOPE-0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_qr_code_is_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        repo.insert(&item("Tea", Some("SHARED-01"))).await.unwrap();
        let err = repo.insert(&item("Mug", Some("SHARED-01"))).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "qr_code");
                assert_eq!(value, "SHARED-01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_soft_delete_hides_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let a = item("Biscuits", None);
        let b = item("apples", None);
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        let listed = repo.list_active(Page::default()).await.unwrap();
        assert_eq!(listed[0].name, "apples");
        assert_eq!(repo.count().await.unwrap(), 2);

        repo.soft_delete(&a.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_qr_code(&a.qr_code).await.unwrap().is_none());
        assert!(!repo.get_by_id(&a.id).await.unwrap().unwrap().is_active);
        assert!(repo.soft_delete(&a.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let mut tea = item("Tea", None);
        repo.insert(&tea).await.unwrap();

        tea.name = "Black Tea".to_string();
        tea.pieces_per_packet = 24;
        repo.update(&tea).await.unwrap();

        let found = repo.get_by_id(&tea.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Black Tea");
        assert_eq!(found.pieces_per_packet, 24);
    }
}
