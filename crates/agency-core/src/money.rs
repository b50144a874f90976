//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing float amounts:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │    profit = selling - investment drifts by fractions of a cent          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every total is an exact i64 sum, so                                  │
//! │    profit == total_selling - total_investment holds bit for bit         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agency_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let doubled = price * 2;
//! assert_eq!(doubled.cents(), 2198);
//!
//! let parsed = Money::parse_decimal("12.345").unwrap();
//! assert_eq!(parsed.cents(), 1235);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Purchase.price_per_packet × quantity ──► Purchase.total_amount ──┐    │
/// │                                                                    │    │
/// │  SaleLine.price_per_piece × quantity ──► Sale.subtotal ──► tax ──┐ │    │
/// │                                                                  ▼ ▼    │
/// │                                                          TallySummary   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a decimal amount such as `"1500"`, `"-12.5"` or `" 0.995 "`.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored
    /// - Optional leading `+` or `-`
    /// - Digits with at most one decimal point
    /// - More than two decimals round half away from zero to the cent
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("1500").unwrap().cents(), 150000);
    /// assert_eq!(Money::parse_decimal("-0.005").unwrap().cents(), -1);
    /// assert!(Money::parse_decimal("abc").is_err());
    /// assert!(Money::parse_decimal("1,000").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match body.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (body, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected digits"));
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(invalid("expected a plain decimal number"));
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes() {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(i64::from(digit - b'0')))
                .ok_or_else(|| invalid("amount is too large"))?;
        }
        cents = cents
            .checked_mul(100)
            .ok_or_else(|| invalid("amount is too large"))?;

        let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = fraction_digits.next().unwrap_or(0);
        let hundredths = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().map_or(false, |d| d >= 5);

        cents = cents
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Converts a float amount (major units) to Money.
    ///
    /// Goes through the shortest decimal representation of the float so that
    /// `1.005` becomes 101 cents rather than 100. Returns `None` for `NaN`,
    /// infinities and values that do not fit.
    pub fn from_major_f64(value: f64) -> Option<Money> {
        if !value.is_finite() {
            return None;
        }
        Money::parse_decimal(&value.to_string()).ok()
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount in major units as a float, for wire output only.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Adds two amounts, returning `None` if the sum does not fit.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(150).checked_add(Money::from_cents(50)), Some(Money::from_cents(200)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts, clamping to the representable range instead of wrapping.
    #[inline]
    pub const fn saturating_sub(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0))
    }

    /// Calculates tax at the given rate, rounding half up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, widened to i128.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    /// use agency_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(1000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(825)); // 8.25%
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// let per_packet = Money::from_cents(2500);
    /// assert_eq!(per_packet.multiply_quantity(4).cents(), 10000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Divides by a count, rounding half away from zero to the cent.
    ///
    /// A zero or negative divisor yields zero; callers use this for
    /// per-piece prices where "no pieces" means "no price".
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// let packet = Money::from_cents(1000);
    /// assert_eq!(packet.divide_rounded(3).cents(), 333);
    /// assert_eq!(packet.divide_rounded(6).cents(), 167);
    /// assert_eq!(packet.divide_rounded(0).cents(), 0);
    /// ```
    pub fn divide_rounded(&self, divisor: i64) -> Money {
        if divisor <= 0 {
            return Money::zero();
        }
        let numerator = self.0 as i128;
        let divisor = divisor as i128;
        let half = divisor / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / divisor
        } else {
            (numerator - half) / divisor
        };
        Money::from_cents(rounded as i64)
    }

    /// Expresses this amount as a percentage of `base`.
    ///
    /// Returns `0.0` when `base` is zero or negative so the result is never
    /// `NaN` or infinite.
    ///
    /// ```rust
    /// use agency_core::money::Money;
    ///
    /// let profit = Money::from_cents(50_000);
    /// let investment = Money::from_cents(100_000);
    /// assert_eq!(profit.percentage_of(investment), 50.0);
    /// assert_eq!(profit.percentage_of(Money::zero()), 0.0);
    /// ```
    pub fn percentage_of(&self, base: Money) -> f64 {
        if base.0 <= 0 {
            return 0.0;
        }
        self.0 as f64 / base.0 as f64 * 100.0
    }

    /// Formats with a currency symbol, e.g. `Rs 1500.00` or `-$5.50`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}.{:02}", sign, symbol, self.major().abs(), self.minor())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal display: `10.99`, `-5.50`, `0.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::zero().to_string(), "0.00");
        assert_eq!(Money::from_cents(-550).format_with("Rs "), "-Rs 5.50");
    }

    #[test]
    fn test_parse_decimal_accepts_plain_numbers() {
        assert_eq!(Money::parse_decimal("1000").unwrap().cents(), 100_000);
        assert_eq!(Money::parse_decimal("  12.5 ").unwrap().cents(), 1250);
        assert_eq!(Money::parse_decimal(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse_decimal("3.").unwrap().cents(), 300);
        assert_eq!(Money::parse_decimal("+2.01").unwrap().cents(), 201);
        assert_eq!(Money::parse_decimal("-2.01").unwrap().cents(), -201);
    }

    #[test]
    fn test_parse_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::parse_decimal("0.994").unwrap().cents(), 99);
        assert_eq!(Money::parse_decimal("0.995").unwrap().cents(), 100);
        assert_eq!(Money::parse_decimal("-0.995").unwrap().cents(), -100);
        assert_eq!(Money::parse_decimal("1.0049999").unwrap().cents(), 100);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for input in ["", " ", "-", ".", "abc", "12abc", "1,000", "1.2.3", "1e3", "--1"] {
            assert!(Money::parse_decimal(input).is_err(), "accepted {input:?}");
        }
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_from_major_f64() {
        assert_eq!(Money::from_major_f64(1500.0).unwrap().cents(), 150_000);
        assert_eq!(Money::from_major_f64(1.005).unwrap().cents(), 101);
        assert_eq!(Money::from_major_f64(-0.1).unwrap().cents(), -10);
        assert!(Money::from_major_f64(f64::NAN).is_none());
        assert!(Money::from_major_f64(f64::INFINITY).is_none());
        assert!(Money::from_major_f64(1e300).is_none());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_tax_calculation() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(1000)).cents(), 100);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)).cents(), 83);
        assert_eq!(amount.calculate_tax(TaxRate::zero()).cents(), 0);
    }

    #[test]
    fn test_divide_rounded() {
        assert_eq!(Money::from_cents(1000).divide_rounded(4).cents(), 250);
        assert_eq!(Money::from_cents(1000).divide_rounded(3).cents(), 333);
        assert_eq!(Money::from_cents(5).divide_rounded(2).cents(), 3);
        assert_eq!(Money::from_cents(-5).divide_rounded(2).cents(), -3);
        assert_eq!(Money::from_cents(1000).divide_rounded(-1).cents(), 0);
    }

    #[test]
    fn test_percentage_of_guards_zero_base() {
        let profit = Money::from_cents(500);
        assert_eq!(profit.percentage_of(Money::from_cents(1000)), 50.0);
        assert_eq!(profit.percentage_of(Money::zero()), 0.0);
        assert_eq!(profit.percentage_of(Money::from_cents(-10)), 0.0);
        assert_eq!((-profit).percentage_of(Money::from_cents(1000)), -50.0);
    }
}
