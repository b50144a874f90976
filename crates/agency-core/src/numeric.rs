//! # Lenient Numeric Input
//!
//! Records coming from the web client carry numbers in whatever shape the
//! form produced them: JSON numbers, numeric strings, empty strings, `null`,
//! or nothing at all. [`NumericInput`] accepts all of them at deserialization
//! time and defers the decision to the caller.
//!
//! ## Coercion Outcomes
//! ```text
//! ┌──────────────────────┬──────────────────┬──────────────────────────────┐
//! │ JSON                 │ to_money()       │ coerce_money()               │
//! ├──────────────────────┼──────────────────┼──────────────────────────────┤
//! │ 1500 / 1500.5        │ Ok(150000/150050)│ value, no issue              │
//! │ "1500.50"            │ Ok(150050)       │ value, no issue              │
//! │ null / absent        │ Err(Missing)     │ 0 + Missing                  │
//! │ "abc" / "" / "1,0"   │ Err(Malformed)   │ 0 + Malformed("abc")         │
//! │ true / [] / {}       │ Err(Malformed)   │ 0 + Malformed("true")        │
//! └──────────────────────┴──────────────────┴──────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// A number as it arrived on the wire.
///
/// Use `#[serde(default)]` on fields of this type so that absent keys become
/// [`NumericInput::Missing`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// A JSON number.
    Number(f64),
    /// A JSON string, expected to hold a decimal number.
    Text(String),
    /// `null` or an absent key.
    #[default]
    Missing,
    /// Any other JSON value (bool, array, object).
    Other(serde_json::Value),
}

/// Why a numeric field was treated as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "raw", rename_all = "snake_case")]
pub enum CoercionIssue {
    /// The field was `null` or absent.
    Missing,
    /// The field held something that is not a decimal number.
    Malformed(String),
    /// The number was `NaN`, infinite, or too large to represent.
    NonFinite,
    /// Adding the value would overflow the running total.
    Overflow,
}

impl fmt::Display for CoercionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoercionIssue::Missing => write!(f, "missing"),
            CoercionIssue::Malformed(raw) => write!(f, "malformed value {raw:?}"),
            CoercionIssue::NonFinite => write!(f, "not a finite number"),
            CoercionIssue::Overflow => write!(f, "total out of range"),
        }
    }
}

impl NumericInput {
    /// Convenience constructor for an amount in cents.
    pub fn from_money(money: Money) -> Self {
        NumericInput::Number(money.to_major_f64())
    }

    /// Convenience constructor for a whole count.
    pub fn from_count(count: i64) -> Self {
        NumericInput::Number(count as f64)
    }

    /// Reads the input as an amount in major units.
    pub fn to_money(&self) -> Result<Money, CoercionIssue> {
        match self {
            NumericInput::Number(n) => Money::from_major_f64(*n).ok_or(CoercionIssue::NonFinite),
            NumericInput::Text(s) => {
                Money::parse_decimal(s).map_err(|_| CoercionIssue::Malformed(s.clone()))
            }
            NumericInput::Missing => Err(CoercionIssue::Missing),
            NumericInput::Other(v) => Err(CoercionIssue::Malformed(v.to_string())),
        }
    }

    /// Reads the input as a whole count (packets, pieces).
    ///
    /// Fractional values are truncated toward zero, as a quantity of
    /// `2.7` packets means two whole packets on a buying slip.
    pub fn to_quantity(&self) -> Result<i64, CoercionIssue> {
        // Cents keep two decimals; dropping them truncates toward zero.
        self.to_money().map(|m| m.cents() / 100)
    }

    /// Returns the amount, or zero with the reason it was zeroed.
    pub fn coerce_money(&self) -> (Money, Option<CoercionIssue>) {
        match self.to_money() {
            Ok(money) => (money, None),
            Err(issue) => (Money::zero(), Some(issue)),
        }
    }

    /// Returns the count, or zero with the reason it was zeroed.
    pub fn coerce_quantity(&self) -> (i64, Option<CoercionIssue>) {
        match self.to_quantity() {
            Ok(qty) => (qty, None),
            Err(issue) => (0, Some(issue)),
        }
    }

    /// Whether the field was absent or `null`.
    pub fn is_missing(&self) -> bool {
        matches!(self, NumericInput::Missing)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default)]
        amount: NumericInput,
    }

    fn amount_field(json: &str) -> NumericInput {
        serde_json::from_str::<Probe>(json).unwrap().amount
    }

    #[test]
    fn test_deserialize_shapes() {
        assert_eq!(amount_field(r#"{"amount": 12}"#), NumericInput::Number(12.0));
        assert_eq!(amount_field(r#"{"amount": "12.5"}"#), NumericInput::Text("12.5".into()));
        assert_eq!(amount_field(r#"{"amount": null}"#), NumericInput::Missing);
        assert_eq!(amount_field(r#"{}"#), NumericInput::Missing);
        assert!(matches!(amount_field(r#"{"amount": true}"#), NumericInput::Other(_)));
        assert!(matches!(amount_field(r#"{"amount": [1]}"#), NumericInput::Other(_)));
    }

    #[test]
    fn test_to_money() {
        assert_eq!(amount_field(r#"{"amount": 1500}"#).to_money().unwrap().cents(), 150_000);
        assert_eq!(amount_field(r#"{"amount": " 99.99 "}"#).to_money().unwrap().cents(), 9999);
        assert_eq!(amount_field(r#"{}"#).to_money(), Err(CoercionIssue::Missing));
        assert_eq!(
            amount_field(r#"{"amount": "abc"}"#).to_money(),
            Err(CoercionIssue::Malformed("abc".into()))
        );
        assert_eq!(
            amount_field(r#"{"amount": false}"#).to_money(),
            Err(CoercionIssue::Malformed("false".into()))
        );
        assert_eq!(
            NumericInput::Number(f64::NAN).to_money(),
            Err(CoercionIssue::NonFinite)
        );
    }

    #[test]
    fn test_to_quantity_truncates() {
        assert_eq!(NumericInput::from(2.7).to_quantity().unwrap(), 2);
        assert_eq!(NumericInput::from("12").to_quantity().unwrap(), 12);
        assert_eq!(NumericInput::from(-1.5).to_quantity().unwrap(), -1);
    }

    #[test]
    fn test_coerce_defaults_to_zero() {
        let (value, issue) = NumericInput::from("").coerce_money();
        assert!(value.is_zero());
        assert_eq!(issue, Some(CoercionIssue::Malformed(String::new())));

        let (value, issue) = NumericInput::from(10.0).coerce_money();
        assert_eq!(value.cents(), 1000);
        assert!(issue.is_none());

        let (qty, issue) = NumericInput::Missing.coerce_quantity();
        assert_eq!(qty, 0);
        assert_eq!(issue, Some(CoercionIssue::Missing));
    }

    #[test]
    fn test_from_money_round_trips_cents() {
        let input = NumericInput::from_money(Money::from_cents(123_456_789));
        assert_eq!(input.to_money().unwrap().cents(), 123_456_789);
    }
}
