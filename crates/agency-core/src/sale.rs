//! # Sale Derivation
//!
//! Computes the derived fields of a sale before it is stored.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale form                                                              │
//! │                                                                         │
//! │  lines: [3 × 5.00, 2 × 12.50]                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal = Σ quantity × price_per_piece          = 40.00               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tax      = subtotal.calculate_tax(rate = 17%)    =  6.80               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total    = subtotal + tax                        = 46.80               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::purchase::trimmed;
use crate::types::{Sale, SaleLine, SaleStatus, TaxRate};
use crate::validation::{
    validate_name, validate_price_cents, validate_quantity, validate_tax_rate_bps, validate_uuid,
};
use crate::MAX_SALE_LINES;

/// One line on a sale form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLineInput {
    pub item_id: Option<String>,
    pub description: String,
    /// Pieces sold.
    pub quantity: i64,
    pub price_per_piece: Money,
}

impl SaleLineInput {
    /// quantity × price_per_piece.
    pub fn line_total(&self) -> Money {
        self.price_per_piece.multiply_quantity(self.quantity)
    }
}

/// Derived money fields of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Computes subtotal, tax and total for `lines` at `tax_rate`.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    /// use agency_core::sale::{SaleLineInput, SaleTotals};
    /// use agency_core::types::TaxRate;
    ///
    /// let lines = vec![
    ///     SaleLineInput { item_id: None, description: "Tea".into(), quantity: 3, price_per_piece: Money::from_cents(500) },
    ///     SaleLineInput { item_id: None, description: "Mug".into(), quantity: 2, price_per_piece: Money::from_cents(1250) },
    /// ];
    /// let totals = SaleTotals::compute(&lines, TaxRate::from_bps(1700));
    /// assert_eq!(totals.subtotal.cents(), 4000);
    /// assert_eq!(totals.tax.cents(), 680);
    /// assert_eq!(totals.total.cents(), 4680);
    /// ```
    pub fn compute(lines: &[SaleLineInput], tax_rate: TaxRate) -> Self {
        let subtotal: Money = lines.iter().map(SaleLineInput::line_total).sum();
        let tax = subtotal.calculate_tax(tax_rate);
        SaleTotals {
            subtotal,
            tax_rate,
            tax,
            total: subtotal + tax,
        }
    }
}

/// A sale form before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub customer_id: Option<String>,
    pub lines: Vec<SaleLineInput>,
    pub tax_rate: TaxRate,
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
}

impl SaleDraft {
    /// Checks the form against the selling rules.
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(ValidationError::Required {
                field: "sale lines".to_string(),
            }
            .into());
        }
        if self.lines.len() > MAX_SALE_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_SALE_LINES,
            });
        }
        if let Some(customer_id) = &self.customer_id {
            validate_uuid(customer_id)?;
        }
        validate_tax_rate_bps(self.tax_rate.bps())?;

        for line in &self.lines {
            validate_name("line description", &line.description)?;
            validate_quantity(line.quantity)?;
            validate_price_cents(line.price_per_piece.cents())?;
            if let Some(item_id) = &line.item_id {
                validate_uuid(item_id)?;
            }
        }

        Ok(())
    }

    /// Derived totals for this form.
    pub fn totals(&self) -> SaleTotals {
        SaleTotals::compute(&self.lines, self.tax_rate)
    }

    /// Validates and builds the sale row and its line rows.
    pub fn into_sale(
        self,
        id: String,
        invoice_number: String,
        now: DateTime<Utc>,
    ) -> CoreResult<(Sale, Vec<SaleLine>)> {
        self.validate()?;
        let totals = self.totals();

        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: id.clone(),
                item_id: line.item_id.clone(),
                description: line.description.trim().to_string(),
                quantity: line.quantity,
                price_per_piece_cents: line.price_per_piece.cents(),
                line_total_cents: line.line_total().cents(),
                position: i as i64 + 1,
            })
            .collect();

        let sale = Sale {
            id,
            invoice_number,
            customer_id: self.customer_id,
            status: SaleStatus::Completed,
            subtotal_cents: totals.subtotal.cents(),
            tax_rate_bps: totals.tax_rate.bps(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            sale_date: self.sale_date,
            notes: trimmed(self.notes),
            created_at: now,
            updated_at: now,
        };

        Ok((sale, lines))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(qty: i64, cents: i64) -> SaleLineInput {
        SaleLineInput {
            item_id: None,
            description: "Green Tea".to_string(),
            quantity: qty,
            price_per_piece: Money::from_cents(cents),
        }
    }

    fn draft(lines: Vec<SaleLineInput>) -> SaleDraft {
        SaleDraft {
            customer_id: None,
            lines,
            tax_rate: TaxRate::from_bps(500),
            sale_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_totals() {
        let totals = draft(vec![line(2, 1000), line(1, 550)]).totals();
        assert_eq!(totals.subtotal.cents(), 2550);
        // 5% of 25.50 = 1.275 → 1.28
        assert_eq!(totals.tax.cents(), 128);
        assert_eq!(totals.total.cents(), 2678);
    }

    #[test]
    fn test_into_sale_builds_lines_in_order() {
        let now = Utc::now();
        let (sale, lines) = draft(vec![line(2, 1000), line(1, 550)])
            .into_sale("s-1".to_string(), "INV-20261018-0001".to_string(), now)
            .unwrap();

        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.total_cents, 2678);
        assert_eq!(sale.tax_rate_bps, 500);
        assert_eq!(sale.notes, None);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].position, 1);
        assert_eq!(lines[1].position, 2);
        assert_eq!(lines[0].line_total_cents, 2000);
        assert!(lines.iter().all(|l| l.sale_id == "s-1"));

        let line_sum: i64 = lines.iter().map(|l| l.line_total_cents).sum();
        assert_eq!(line_sum, sale.subtotal_cents);
    }

    #[test]
    fn test_largest_valid_sale_fits() {
        let lines = (0..MAX_SALE_LINES)
            .map(|_| line(crate::MAX_QUANTITY, crate::MAX_PRICE_CENTS))
            .collect();
        let mut d = draft(lines);
        d.tax_rate = TaxRate::from_bps(10_000);
        assert!(d.validate().is_ok());

        let totals = d.totals();
        assert_eq!(totals.subtotal.cents(), 1_000_000_000_000_000_000);
        assert_eq!(totals.total.cents(), 2_000_000_000_000_000_000);
    }

    #[test]
    fn test_rejects_empty_and_bad_lines() {
        assert!(draft(vec![]).validate().is_err());
        assert!(draft(vec![line(0, 100)]).validate().is_err());
        assert!(draft(vec![line(1, -100)]).validate().is_err());

        let mut d = draft(vec![line(1, 100)]);
        d.tax_rate = TaxRate::from_bps(10_001);
        assert!(d.validate().is_err());

        assert!(draft(vec![line(1, crate::MAX_PRICE_CENTS + 1)]).validate().is_err());

        let too_many = draft((0..=MAX_SALE_LINES).map(|_| line(1, 1)).collect());
        assert!(matches!(
            too_many.validate(),
            Err(CoreError::TooManyLines { .. })
        ));
    }
}
