//! # Order Tally
//!
//! Reduces purchase records and sale records to a single [`TallySummary`].
//! Every view that shows investment, revenue or profit goes through
//! [`compute_tally`] or [`tally_records`]; nothing else sums amounts.
//!
//! ## Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  purchases[i].totalAmount ──Σ──► total_investment ─────────┐           │
//! │                                                             │           │
//! │  sales[i].totalAmount ─────Σ──► total_selling ──┬──► profit = S − I    │
//! │                                                  │                      │
//! │  sales[i].taxAmount ───────Σ──► total_tax ──► net_selling = S − T      │
//! │                                                                         │
//! │  profit_percentage = I > 0 ? profit / I × 100 : 0                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Malformed numbers
//! A field that cannot be read counts as zero. [`TallyPolicy::Lenient`]
//! reports each such field as a [`CoercionWarning`];
//! [`TallyPolicy::Strict`] refuses the whole tally instead.
//!
//! ```rust
//! use agency_core::tally::{compute_tally, PurchaseRecord, SaleRecord};
//!
//! let purchases = vec![PurchaseRecord::with_total(1000.0)];
//! let sales = vec![SaleRecord::with_totals(1500.0, 50.0)];
//!
//! let summary = compute_tally(&purchases, &sales);
//! assert_eq!(summary.profit.cents(), 50_000);
//! assert_eq!(summary.profit_percentage, 50.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::numeric::{CoercionIssue, NumericInput};
use crate::types::{Purchase, Sale, SaleLine};

// =============================================================================
// Wire Records
// =============================================================================

/// A buying record as the web client submits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    /// Packets bought.
    #[serde(default)]
    pub quantity: NumericInput,
    #[serde(default)]
    pub price_per_packet: NumericInput,
    #[serde(default)]
    pub pieces_per_packet: NumericInput,
    /// quantity × pricePerPacket, computed by the form.
    #[serde(default)]
    pub total_amount: NumericInput,
}

impl PurchaseRecord {
    /// A record carrying only a total, as most tally inputs do.
    pub fn with_total(total_amount: impl Into<NumericInput>) -> Self {
        PurchaseRecord {
            total_amount: total_amount.into(),
            ..Default::default()
        }
    }
}

/// One line of a sale record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecordLine {
    #[serde(default)]
    pub quantity: NumericInput,
    #[serde(default)]
    pub price_per_piece: NumericInput,
}

/// A sale record as the web client submits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[serde(default)]
    pub items: Vec<SaleRecordLine>,
    #[serde(default)]
    pub subtotal: NumericInput,
    /// Tax rate in percent.
    #[serde(default)]
    pub tax_rate: NumericInput,
    #[serde(default)]
    pub tax_amount: NumericInput,
    #[serde(default)]
    pub total_amount: NumericInput,
}

impl SaleRecord {
    /// A record carrying only the total and tax, as most tally inputs do.
    pub fn with_totals(
        total_amount: impl Into<NumericInput>,
        tax_amount: impl Into<NumericInput>,
    ) -> Self {
        SaleRecord {
            total_amount: total_amount.into(),
            tax_amount: tax_amount.into(),
            ..Default::default()
        }
    }
}

impl From<&Purchase> for PurchaseRecord {
    fn from(p: &Purchase) -> Self {
        PurchaseRecord {
            quantity: NumericInput::from_count(p.quantity),
            price_per_packet: NumericInput::from_money(Money::from_cents(p.price_per_packet_cents)),
            pieces_per_packet: NumericInput::from_count(p.pieces_per_packet),
            total_amount: NumericInput::from_money(p.total_amount()),
        }
    }
}

impl SaleRecord {
    /// Builds the wire record of a persisted sale and its lines.
    pub fn from_sale(sale: &Sale, lines: &[SaleLine]) -> Self {
        SaleRecord {
            items: lines
                .iter()
                .map(|line| SaleRecordLine {
                    quantity: NumericInput::from_count(line.quantity),
                    price_per_piece: NumericInput::from_money(Money::from_cents(
                        line.price_per_piece_cents,
                    )),
                })
                .collect(),
            subtotal: NumericInput::from_money(Money::from_cents(sale.subtotal_cents)),
            tax_rate: NumericInput::Number(sale.tax_rate().percentage()),
            tax_amount: NumericInput::from_money(Money::from_cents(sale.tax_cents)),
            total_amount: NumericInput::from_money(sale.total()),
        }
    }
}

impl From<&Sale> for SaleRecord {
    fn from(sale: &Sale) -> Self {
        SaleRecord::from_sale(sale, &[])
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Aggregate of investment vs. revenue vs. profit. Computed, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TallySummary {
    pub total_investment: Money,
    pub total_selling: Money,
    pub total_tax: Money,
    /// total_selling − total_tax.
    pub net_selling: Money,
    /// total_selling − total_investment.
    pub profit: Money,
    /// profit / total_investment × 100, or 0 without investment.
    pub profit_percentage: f64,
}

impl TallySummary {
    fn from_totals(total_investment: Money, total_selling: Money, total_tax: Money) -> Self {
        let profit = total_selling.saturating_sub(total_investment);
        TallySummary {
            total_investment,
            total_selling,
            total_tax,
            net_selling: total_selling.saturating_sub(total_tax),
            profit,
            profit_percentage: profit.percentage_of(total_investment),
        }
    }

    /// Whether the period made a loss.
    pub fn is_loss(&self) -> bool {
        self.profit.is_negative()
    }
}

// =============================================================================
// Policy & Warnings
// =============================================================================

/// How malformed numeric fields are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyPolicy {
    /// Malformed fields count as zero and are reported as warnings.
    #[default]
    Lenient,
    /// The first malformed field fails the tally. Missing fields still count
    /// as zero.
    Strict,
}

/// Which record list a warning points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Purchase,
    Sale,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Purchase => write!(f, "purchase"),
            RecordKind::Sale => write!(f, "sale"),
        }
    }
}

/// A field that was counted as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoercionWarning {
    pub record: RecordKind,
    /// Position of the record in its input list.
    pub index: usize,
    /// Wire name of the field, e.g. `totalAmount`.
    pub field: String,
    pub issue: CoercionIssue,
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} {}: {}, counted as 0",
            self.record, self.index, self.field, self.issue
        )
    }
}

/// Summary plus every field that had to be zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyReport {
    pub summary: TallySummary,
    pub warnings: Vec<CoercionWarning>,
}

impl TallyReport {
    /// Whether any field was coerced.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Computes the tally, counting unreadable amounts as zero.
///
/// Pure and deterministic: the same input always produces the same summary.
///
/// ```rust
/// use agency_core::tally::{compute_tally, PurchaseRecord};
///
/// let summary = compute_tally(&[PurchaseRecord::with_total("abc")], &[]);
/// assert!(summary.total_investment.is_zero());
/// ```
pub fn compute_tally(purchases: &[PurchaseRecord], sales: &[SaleRecord]) -> TallySummary {
    let mut sink = Vec::new();
    accumulate(purchases, sales, &mut sink)
}

/// Computes the tally under `policy`, reporting coerced fields.
///
/// ## Errors
/// [`CoreError::MalformedAmount`] under [`TallyPolicy::Strict`] when a
/// `totalAmount` or `taxAmount` holds something that is not a number.
pub fn tally_records(
    purchases: &[PurchaseRecord],
    sales: &[SaleRecord],
    policy: TallyPolicy,
) -> CoreResult<TallyReport> {
    let mut warnings = Vec::new();
    let summary = accumulate(purchases, sales, &mut warnings);

    if policy == TallyPolicy::Strict {
        if let Some(w) = warnings
            .iter()
            .find(|w| !matches!(w.issue, CoercionIssue::Missing))
        {
            return Err(CoreError::MalformedAmount {
                record: w.record.to_string(),
                index: w.index,
                field: w.field.clone(),
                value: match &w.issue {
                    CoercionIssue::Malformed(raw) => raw.clone(),
                    other => other.to_string(),
                },
            });
        }
    }

    Ok(TallyReport { summary, warnings })
}

fn accumulate(
    purchases: &[PurchaseRecord],
    sales: &[SaleRecord],
    warnings: &mut Vec<CoercionWarning>,
) -> TallySummary {
    // A value that would overflow its total is left out and reported
    let mut add = |total: &mut Money,
                   record: RecordKind,
                   index: usize,
                   field: &'static str,
                   input: &NumericInput| {
        let (value, issue) = input.coerce_money();
        let issue = issue.or_else(|| match total.checked_add(value) {
            Some(sum) => {
                *total = sum;
                None
            }
            None => Some(CoercionIssue::Overflow),
        });
        if let Some(issue) = issue {
            warnings.push(CoercionWarning {
                record,
                index,
                field: field.to_string(),
                issue,
            });
        }
    };

    let mut total_investment = Money::zero();
    for (i, p) in purchases.iter().enumerate() {
        add(&mut total_investment, RecordKind::Purchase, i, "totalAmount", &p.total_amount);
    }

    let mut total_selling = Money::zero();
    let mut total_tax = Money::zero();
    for (i, s) in sales.iter().enumerate() {
        add(&mut total_selling, RecordKind::Sale, i, "totalAmount", &s.total_amount);
        add(&mut total_tax, RecordKind::Sale, i, "taxAmount", &s.tax_amount);
    }

    TallySummary::from_totals(total_investment, total_selling, total_tax)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(n: i64) -> Money {
        Money::from_cents(n)
    }

    #[test]
    fn test_empty_inputs_are_all_zero() {
        let summary = compute_tally(&[], &[]);
        assert_eq!(summary, TallySummary::default());
        assert_eq!(summary.profit_percentage, 0.0);
    }

    #[test]
    fn test_worked_example() {
        let purchases = vec![PurchaseRecord::with_total(1000.0)];
        let sales = vec![SaleRecord::with_totals(1500.0, 50.0)];

        let s = compute_tally(&purchases, &sales);
        assert_eq!(s.total_investment, cents(100_000));
        assert_eq!(s.total_selling, cents(150_000));
        assert_eq!(s.total_tax, cents(5_000));
        assert_eq!(s.net_selling, cents(145_000));
        assert_eq!(s.profit, cents(50_000));
        assert_eq!(s.profit_percentage, 50.0);
    }

    #[test]
    fn test_malformed_total_counts_as_zero() {
        let s = compute_tally(&[PurchaseRecord::with_total("abc")], &[]);
        assert!(s.total_investment.is_zero());
    }

    #[test]
    fn test_no_investment_means_zero_percentage() {
        let sales = vec![SaleRecord::with_totals(200.0, 0.0)];
        let s = compute_tally(&[], &sales);
        assert!(s.total_selling.is_positive());
        assert_eq!(s.profit_percentage, 0.0);
        assert!(s.profit_percentage.is_finite());
    }

    #[test]
    fn test_profit_identity_holds_exactly() {
        let purchases: Vec<_> = ["0.1", "0.2", "1234.56", "7.777"]
            .into_iter()
            .map(PurchaseRecord::with_total)
            .collect();
        let sales = vec![
            SaleRecord::with_totals(0.3, 0.01),
            SaleRecord::with_totals("999.99", "12.5"),
        ];

        let s = compute_tally(&purchases, &sales);
        assert_eq!(s.profit, s.total_selling - s.total_investment);
        assert_eq!(s.net_selling, s.total_selling - s.total_tax);
        assert_eq!(s.total_investment, cents(10 + 20 + 123_456 + 778));
    }

    #[test]
    fn test_idempotent() {
        let purchases = vec![PurchaseRecord::with_total("10.10"), PurchaseRecord::with_total(3.0)];
        let sales = vec![SaleRecord::with_totals("20", "x")];
        assert_eq!(compute_tally(&purchases, &sales), compute_tally(&purchases, &sales));
    }

    #[test]
    fn test_loss_has_negative_percentage() {
        let s = compute_tally(
            &[PurchaseRecord::with_total(400.0)],
            &[SaleRecord::with_totals(300.0, 0.0)],
        );
        assert!(s.is_loss());
        assert_eq!(s.profit, cents(-10_000));
        assert_eq!(s.profit_percentage, -25.0);
    }

    #[test]
    fn test_lenient_report_lists_coerced_fields() {
        let purchases = vec![PurchaseRecord::with_total("abc"), PurchaseRecord::default()];
        let sales = vec![SaleRecord::with_totals(100.0, "n/a")];

        let report = tally_records(&purchases, &sales, TallyPolicy::Lenient).unwrap();
        assert_eq!(report.summary.total_selling, cents(10_000));
        assert_eq!(report.warnings.len(), 3);
        assert_eq!(
            report.warnings[0],
            CoercionWarning {
                record: RecordKind::Purchase,
                index: 0,
                field: "totalAmount".to_string(),
                issue: CoercionIssue::Malformed("abc".into()),
            }
        );
        assert_eq!(report.warnings[1].issue, CoercionIssue::Missing);
        assert_eq!(report.warnings[2].field, "taxAmount");
        assert_eq!(
            report.warnings[0].to_string(),
            "purchase #0 totalAmount: malformed value \"abc\", counted as 0"
        );
    }

    #[test]
    fn test_lenient_report_matches_compute_tally() {
        let purchases = vec![PurchaseRecord::with_total("12x"), PurchaseRecord::with_total(8.0)];
        let sales = vec![SaleRecord::with_totals(30.0, 1.5)];
        let report = tally_records(&purchases, &sales, TallyPolicy::Lenient).unwrap();
        assert_eq!(report.summary, compute_tally(&purchases, &sales));
    }

    #[test]
    fn test_strict_rejects_malformed_but_not_missing() {
        let missing_tax = vec![SaleRecord {
            total_amount: 10.0.into(),
            ..Default::default()
        }];
        let report = tally_records(&[], &missing_tax, TallyPolicy::Strict).unwrap();
        assert_eq!(report.summary.total_selling, cents(1_000));
        assert_eq!(report.warnings.len(), 1);

        let err = tally_records(
            &[PurchaseRecord::with_total(5.0), PurchaseRecord::with_total("abc")],
            &[],
            TallyPolicy::Strict,
        )
        .unwrap_err();
        match err {
            CoreError::MalformedAmount {
                record,
                index,
                field,
                value,
            } => {
                assert_eq!(record, "purchase");
                assert_eq!(index, 1);
                assert_eq!(field, "totalAmount");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_totals_are_left_out() {
        let huge = "90000000000000000";
        let purchases = vec![PurchaseRecord::with_total(huge), PurchaseRecord::with_total(huge)];

        let report = tally_records(&purchases, &[], TallyPolicy::Lenient).unwrap();
        assert_eq!(report.summary.total_investment, cents(9_000_000_000_000_000_000));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].index, 1);
        assert_eq!(report.warnings[0].issue, CoercionIssue::Overflow);
        assert_eq!(compute_tally(&purchases, &[]), report.summary);

        // profit = 0 - 9e18 cents still fits; net selling stays exact
        assert_eq!(report.summary.profit, cents(-9_000_000_000_000_000_000));
        assert!(report.summary.profit_percentage.is_finite());

        let err = tally_records(&purchases, &[], TallyPolicy::Strict).unwrap_err();
        assert!(matches!(err, CoreError::MalformedAmount { index: 1, .. }));
    }

    #[test]
    fn test_profit_saturates_instead_of_wrapping() {
        let purchases = vec![PurchaseRecord::with_total("-90000000000000000")];
        let sales = vec![SaleRecord::with_totals("90000000000000000", "-90000000000000000")];

        let s = compute_tally(&purchases, &sales);
        assert_eq!(s.profit, cents(i64::MAX));
        assert_eq!(s.net_selling, cents(i64::MAX));
    }

    #[test]
    fn test_deserializes_client_json() {
        let purchases: Vec<PurchaseRecord> = serde_json::from_str(
            r#"[
                {"quantity": 10, "pricePerPacket": 100, "piecesPerPacket": 12, "totalAmount": 1000},
                {"quantity": "2", "pricePerPacket": "50.5", "totalAmount": "101"}
            ]"#,
        )
        .unwrap();
        let sales: Vec<SaleRecord> = serde_json::from_str(
            r#"[{"items": [{"quantity": 3, "pricePerPiece": 500}], "subtotal": 1500,
                 "taxRate": 0, "taxAmount": 0, "totalAmount": 1500}]"#,
        )
        .unwrap();

        let s = compute_tally(&purchases, &sales);
        assert_eq!(s.total_investment, cents(110_100));
        assert_eq!(s.total_selling, cents(150_000));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(compute_tally(&[], &[])).unwrap();
        assert!(json.get("totalInvestment").is_some());
        assert!(json.get("profitPercentage").is_some());
    }
}
