//! # Customer Repository
//!
//! Customers that sales can be billed to. Deleting a customer keeps their
//! sales; the foreign key is cleared (`ON DELETE SET NULL`).

use agency_core::validation::{validate_email, validate_name};
use agency_core::{Customer, Page};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, created_at, updated_at";

/// Repository for customer operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer after checking name and e-mail.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        validate_customer(customer)?;
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Lists customers by name.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Customer>> {
        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            ORDER BY name COLLATE NOCASE
            LIMIT ?1 OFFSET ?2
            "#
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Case-insensitive substring search on name and phone.
    pub async fn search(&self, query: &str, limit: i64) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE name LIKE ?1 ESCAPE '\' OR phone LIKE ?1 ESCAPE '\'
            ORDER BY name COLLATE NOCASE
            LIMIT ?2
            "#
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Updates contact details.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        validate_customer(customer)?;
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                address = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Counts customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn validate_customer(customer: &Customer) -> DbResult<()> {
    validate_name("customer name", &customer.name).map_err(agency_core::CoreError::from)?;
    validate_email(customer.email.as_deref()).map_err(agency_core::CoreError::from)?;
    Ok(())
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// =============================================================================
// Unit Tests
// =============================================================================
