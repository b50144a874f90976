//! # Domain Types
//!
//! Core domain types used throughout Agency Books.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Purchase     │   │      Sale       │   │      Item       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity       │   │  invoice_number │   │  name           │       │
//! │  │  price/packet   │   │  subtotal       │   │  qr_code        │       │
//! │  │  pieces/packet  │   │  tax / total    │   │  pieces/packet  │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │ 1..n                                  │
//! │  ┌─────────────────┐   ┌────────┴────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │    SaleLine     │   │    Customer     │       │
//! │  │  bps (u32)      │   │  qty × price    │   │  name, contact  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity carries a UUID v4 `id`. Money columns are integer cents and
//! named with a `_cents` suffix, mirroring the SQLite schema.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1700 bps = 17%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Parses a percentage string such as `"17"` or `"8.25"`.
    ///
    /// ```rust
    /// use agency_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::parse_percentage("8.25").unwrap().bps(), 825);
    /// assert!(TaxRate::parse_percentage("101").is_err());
    /// assert!(TaxRate::parse_percentage("-1").is_err());
    /// ```
    pub fn parse_percentage(input: &str) -> Result<Self, ValidationError> {
        // Hundredths of a percent are exactly basis points.
        let bps = Money::parse_decimal(input)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "tax rate".to_string(),
                reason: "expected a percentage like 17 or 8.25".to_string(),
            })?
            .cents();

        if !(0..=10_000).contains(&bps) {
            return Err(ValidationError::OutOfRange {
                field: "tax rate (bps)".to_string(),
                min: 0,
                max: 10_000,
            });
        }

        Ok(TaxRate(bps as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Purchase (buying)
// =============================================================================

/// A recorded acquisition of stock.
///
/// Derived columns (`total_pieces`, `price_per_piece_cents`,
/// `total_amount_cents`) are computed by [`crate::purchase::PurchaseDraft`]
/// before the row is written and are never edited independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    /// Name of the purchased product as written on the buying slip.
    pub item_name: String,
    /// Inventory item this purchase restocks, if linked.
    pub item_id: Option<String>,
    pub supplier: Option<String>,
    /// Number of packets bought.
    pub quantity: i64,
    pub price_per_packet_cents: i64,
    pub pieces_per_packet: i64,
    /// quantity × pieces_per_packet.
    pub total_pieces: i64,
    pub price_per_piece_cents: i64,
    /// quantity × price_per_packet.
    pub total_amount_cents: i64,
    #[ts(as = "String")]
    pub purchase_date: NaiveDate,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// Returns the purchase total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale was completed and counts toward the tally.
    Completed,
    /// Sale was cancelled; kept for the record, excluded from the tally.
    Voided,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

impl SaleStatus {
    /// Lowercase name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Voided => "voided",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale to a customer. Totals are frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub invoice_number: String,
    pub customer_id: Option<String>,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub tax_rate_bps: u32,
    pub tax_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the tax rate.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether the sale counts toward the tally.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == SaleStatus::Completed
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line on a sale. Description and price are snapshots taken at sale time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub item_id: Option<String>,
    pub description: String,
    /// Pieces sold.
    pub quantity: i64,
    pub price_per_piece_cents: i64,
    /// quantity × price_per_piece.
    pub line_total_cents: i64,
    /// Position on the invoice, starting at 1.
    pub position: i64,
}

impl SaleLine {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Item (inventory)
// =============================================================================

/// An inventory item labelled with a QR payload string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Payload encoded into the item's QR label. Unique.
    pub qr_code: String,
    pub pieces_per_packet: i64,
    /// Soft-delete flag.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Filters
// =============================================================================

/// Inclusive date filter used by list views and the tally.
///
/// Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range, rejecting `from > to`.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, ValidationError> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(ValidationError::InvertedRange {
                    from: f.to_string(),
                    to: t.to_string(),
                });
            }
        }
        Ok(DateRange { from, to })
    }

    /// A range with both ends open.
    pub const fn all() -> Self {
        DateRange { from: None, to: None }
    }

    /// Checks whether `date` falls inside the range (both ends inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }
}

/// Page request for list views (1-based page numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Largest page size a list view may request.
    pub const MAX_PER_PAGE: u32 = 500;

    /// Creates a page request; page 0 becomes 1 and the size is clamped to
    /// `1..=MAX_PER_PAGE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        Page {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    /// Row offset of the first entry on this page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    /// Row limit for this page.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Number of pages needed for `total` rows (at least 1).
    pub fn total_pages(&self, total: i64) -> u32 {
        if total <= 0 {
            return 1;
        }
        let per_page = i64::from(self.per_page);
        ((total + per_page - 1) / per_page) as u32
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(1, 20)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert_eq!(TaxRate::from_percentage(-3.0).bps(), 0);
    }

    #[test]
    fn test_tax_rate_parse_percentage() {
        assert_eq!(TaxRate::parse_percentage("17").unwrap().bps(), 1700);
        assert_eq!(TaxRate::parse_percentage("0").unwrap().bps(), 0);
        assert_eq!(TaxRate::parse_percentage("100").unwrap().bps(), 10_000);
        assert!(TaxRate::parse_percentage("17%").is_err());
    }

    #[test]
    fn test_sale_status_default() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        assert_eq!(SaleStatus::Voided.as_str(), "voided");
    }

    #[test]
    fn test_date_range() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let mar = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let range = DateRange::new(Some(jan), Some(feb)).unwrap();
        assert!(range.contains(jan));
        assert!(range.contains(feb));
        assert!(!range.contains(mar));

        assert!(DateRange::all().contains(mar));
        assert!(DateRange::new(Some(feb), None).unwrap().contains(mar));
        assert!(DateRange::new(Some(mar), Some(jan)).is_err());
    }

    #[test]
    fn test_page_math() {
        let page = Page::new(3, 20);
        assert_eq!(page.offset(), 40);
        assert_eq!(page.limit(), 20);
        assert_eq!(page.total_pages(0), 1);
        assert_eq!(page.total_pages(40), 2);
        assert_eq!(page.total_pages(41), 3);

        let clamped = Page::new(0, 10_000);
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.per_page, Page::MAX_PER_PAGE);
        assert_eq!(clamped.offset(), 0);
    }
}
