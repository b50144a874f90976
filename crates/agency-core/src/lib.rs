//! # agency-core: Pure Business Logic for Agency Books
//!
//! This crate holds the bookkeeping rules of a small trading agency: what was
//! bought, what was sold, and whether the two add up to a profit. Everything
//! here is a pure function over in-memory values.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Agency Books Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    agency (CLI binary)                          │   │
//! │  │   purchase ─ sale ─ item ─ customer ─ invoice ─ tally ─ stats  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ agency-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   tally   │  │   money   │  │ purchase  │  │  invoice  │  │   │
//! │  │   │  Summary  │  │   Money   │  │   sale    │  │  Invoice  │  │   │
//! │  │   │  Report   │  │  numeric  │  │   item    │  │  verify   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   agency-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`tally`] - Totals, profit and profit percentage over purchase/sale records
//! - [`numeric`] - Lenient numeric input and coercion to zero
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Domain types (Purchase, Sale, Item, Customer, etc.)
//! - [`purchase`] / [`sale`] / [`item`] - Forms and their derived fields
//! - [`invoice`] - Invoice numbering and assembly
//! - [`error`] / [`validation`] - Domain errors and business rules
//!
//! ## Example Usage
//!
//! ```rust
//! use agency_core::tally::{compute_tally, PurchaseRecord, SaleRecord};
//!
//! let purchases = vec![PurchaseRecord::with_total(100.0), PurchaseRecord::with_total(50.0)];
//! let sales = vec![SaleRecord::with_totals(120.0, 12.0), SaleRecord::with_totals(60.0, 6.0)];
//!
//! let summary = compute_tally(&purchases, &sales);
//! assert_eq!(summary.total_investment.cents(), 15_000);
//! assert_eq!(summary.total_selling.cents(), 18_000);
//! assert_eq!(summary.net_selling.cents(), 16_200);
//! assert_eq!(summary.profit.cents(), 3_000);
//! assert_eq!(summary.profit_percentage, 20.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod item;
pub mod money;
pub mod numeric;
pub mod purchase;
pub mod sale;
pub mod tally;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use numeric::NumericInput;
pub use tally::{compute_tally, tally_records, TallyPolicy, TallyReport, TallySummary};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest packet or piece count accepted on a single form line.
///
/// ## Business Reason
/// Catches typos such as an extra zero on a packet count.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Maximum lines on one sale.
pub const MAX_SALE_LINES: usize = 100;

/// Largest price in cents (100,000,000.00) accepted for a packet or piece.
///
/// A full sale of [`MAX_SALE_LINES`] lines at [`MAX_QUANTITY`] and this
/// price, plus 100% tax, still fits in `i64` cents.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;
