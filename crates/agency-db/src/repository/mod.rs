//! # Repository Module
//!
//! Database repository implementations for Agency Books.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.purchases().list(&range, page)                             │
//! │       ▼                                                                 │
//! │  PurchaseRepository                                                    │
//! │  ├── insert(&self, purchase)                                           │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self, range, page)                                          │
//! │  └── tally_inputs(&self, range)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Date filters bind `Option<NaiveDate>` twice: `(?1 IS NULL OR col >= ?1)`.
//! Dates are stored as `YYYY-MM-DD`, so the comparison is lexical and exact.
//!
//! ## Available Repositories
//!
//! - [`purchase::PurchaseRepository`] - Purchase CRUD and tally inputs
//! - [`sale::SaleRepository`] - Sales, sale lines, invoice numbering
//! - [`item::ItemRepository`] - Inventory items and QR lookup
//! - [`customer::CustomerRepository`] - Customer CRUD and search
//! - [`dashboard::DashboardRepository`] - Tally and record counts

pub mod customer;
pub mod dashboard;
pub mod item;
pub mod purchase;
pub mod sale;
