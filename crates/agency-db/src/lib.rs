//! # agency-db: Database Layer for Agency Books
//!
//! This crate provides database access for Agency Books.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Agency Books Data Flow                             │
//! │                                                                         │
//! │  agency tally --from 2026-10-01                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     agency-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ PurchaseRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ ItemRepo      │    │ ...          │  │   │
//! │  │   │ Management    │    │ DashboardRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool management
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (purchase, sale, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agency_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/agency.db")).await?;
//!
//! let stats = db.dashboard().stats(&DateRange::all()).await?;
//! println!("profit: {}", stats.tally.profit);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::dashboard::{DashboardRepository, DashboardStats};
pub use repository::item::ItemRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
