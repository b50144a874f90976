//! # Invoices
//!
//! An [`Invoice`] is the printable view of a stored sale. This module only
//! assembles and checks the document; turning it into paper or PDF is the
//! caller's business.
//!
//! ## Invoice Numbers
//! `INV-YYYYMMDD-NNNN`, where `NNNN` restarts at 0001 every day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, Sale, SaleLine, SaleStatus, TaxRate};

const INVOICE_PREFIX: &str = "INV";

/// Formats an invoice number for `date` and the day's sequence number.
///
/// ```rust
/// use agency_core::invoice::generate_invoice_number;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// assert_eq!(generate_invoice_number(day, 7), "INV-20261018-0007");
/// ```
pub fn generate_invoice_number(date: NaiveDate, sequence: u32) -> String {
    format!("{}{:04}", invoice_number_prefix(date), sequence)
}

/// The part of every invoice number issued on `date` that precedes the
/// sequence, e.g. `INV-20261018-`.
pub fn invoice_number_prefix(date: NaiveDate) -> String {
    format!("{}-{}-", INVOICE_PREFIX, date.format("%Y%m%d"))
}

/// Splits an invoice number back into its date and sequence.
///
/// Returns `None` for numbers that were not produced by
/// [`generate_invoice_number`].
pub fn parse_invoice_number(number: &str) -> Option<(NaiveDate, u32)> {
    let mut parts = number.splitn(3, '-');
    if parts.next()? != INVOICE_PREFIX {
        return None;
    }
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y%m%d").ok()?;
    let sequence = parts.next()?.parse().ok()?;
    Some((date, sequence))
}

/// Who issues the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Issuer {
    pub name: String,
    pub address: Vec<String>,
    pub currency_symbol: String,
}

/// Who the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BillTo {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl From<&Customer> for BillTo {
    fn from(c: &Customer) -> Self {
        BillTo {
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
            address: c.address.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceLine {
    pub position: i64,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A printable invoice assembled from a stored sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub invoice_number: String,
    pub sale_id: String,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    pub issuer: Issuer,
    pub bill_to: Option<BillTo>,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Money,
    pub tax_rate: TaxRate,
    pub tax: Money,
    pub total: Money,
    pub voided: bool,
}

impl Invoice {
    /// Assembles the invoice for `sale`. Lines are ordered by position.
    pub fn build(
        sale: &Sale,
        lines: &[SaleLine],
        customer: Option<&Customer>,
        issuer: Issuer,
    ) -> Invoice {
        let mut lines: Vec<InvoiceLine> = lines
            .iter()
            .map(|l| InvoiceLine {
                position: l.position,
                description: l.description.clone(),
                quantity: l.quantity,
                unit_price: Money::from_cents(l.price_per_piece_cents),
                line_total: l.line_total(),
            })
            .collect();
        lines.sort_by_key(|l| l.position);

        Invoice {
            invoice_number: sale.invoice_number.clone(),
            sale_id: sale.id.clone(),
            issue_date: sale.sale_date,
            issuer,
            bill_to: customer.map(BillTo::from),
            lines,
            subtotal: Money::from_cents(sale.subtotal_cents),
            tax_rate: sale.tax_rate(),
            tax: Money::from_cents(sale.tax_cents),
            total: sale.total(),
            voided: sale.status == SaleStatus::Voided,
        }
    }

    /// Checks that the document adds up.
    ///
    /// ## Rules
    /// - Every line total equals quantity × unit price
    /// - Line totals sum to the subtotal
    /// - Tax equals the subtotal taxed at the invoice rate
    /// - Total equals subtotal + tax
    pub fn verify(&self) -> CoreResult<()> {
        let fail = |reason: String| CoreError::InconsistentInvoice {
            invoice_number: self.invoice_number.clone(),
            reason,
        };

        for line in &self.lines {
            if line.unit_price.multiply_quantity(line.quantity) != line.line_total {
                return Err(fail(format!("line {} total does not match", line.position)));
            }
        }

        let line_sum: Money = self.lines.iter().map(|l| l.line_total).sum();
        if line_sum != self.subtotal {
            return Err(fail(format!(
                "lines sum to {} but subtotal is {}",
                line_sum, self.subtotal
            )));
        }

        let expected_tax = self.subtotal.calculate_tax(self.tax_rate);
        if expected_tax != self.tax {
            return Err(fail(format!("tax should be {} but is {}", expected_tax, self.tax)));
        }

        if self.subtotal + self.tax != self.total {
            return Err(fail("total is not subtotal + tax".to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
