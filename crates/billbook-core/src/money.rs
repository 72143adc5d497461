//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FLOATING POINT                      INTEGER MINOR UNITS                │
//! │  ─────────────────────────────────   ─────────────────────────────      │
//! │  0.1 + 0.2 = 0.30000000000000004     10 + 20 = 30                       │
//! │  Σ of 1000 line items drifts         Σ is exact                         │
//! │  "₹236.00000001" on an invoice       "₹236.00"                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Shape
//! Backup files and the stored snapshot carry money as a plain JSON number of
//! major units (`236` or `236.5`). `Money` serializes to that shape and
//! decodes it leniently: missing, `null` or non-numeric values become zero,
//! numeric strings are parsed.
//!
//! ## Usage
//! ```rust
//! use billbook_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_minor(10_050); // 100.50
//!
//! // Arithmetic operations
//! let total = price + Money::from_minor(500); // 105.50
//! assert_eq!(total.minor(), 10_550);
//!
//! // Exact decimal parsing for user input
//! assert_eq!(Money::parse("236.5"), Some(Money::from_minor(23_650)));
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::lenient;
use crate::types::TaxRate;

/// Minor units per major unit (paise per rupee).
const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `total - paid` may go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Custom serde**: number of major units on the wire, lenient decode
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► LineItem.price ──► line amount ──► Invoice.subTotal │
/// │                                                                         │
/// │  Invoice.total ──► Invoice.paid ──► outstanding ──► Dashboard.totalDue │
/// │                                                                         │
/// │  Expense.amount ──► ExpenseBreakdown ──► monthly profit                │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (paise, cents).
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * MINOR_PER_MAJOR - minor)
        } else {
            Money(major * MINOR_PER_MAJOR + minor)
        }
    }

    /// Creates a Money value from a decimal number of major units, rounded
    /// to the nearest minor unit. Non-finite input yields zero.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(236.5).minor(), 23_650);
    /// assert_eq!(Money::from_decimal(f64::NAN), Money::zero());
    /// ```
    pub fn from_decimal(value: f64) -> Self {
        if !value.is_finite() {
            return Money::zero();
        }
        Money((value * MINOR_PER_MAJOR as f64).round() as i64)
    }

    /// Parses a decimal string exactly, without going through `f64`.
    ///
    /// Accepts an optional sign, digits and an optional fractional part.
    /// A third fractional digit rounds half away from zero; further digits
    /// are ignored. Returns `None` for anything else.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::parse("10.99"), Some(Money::from_minor(1099)));
    /// assert_eq!(Money::parse("-5.5"), Some(Money::from_minor(-550)));
    /// assert_eq!(Money::parse("0.125"), Some(Money::from_minor(13)));
    /// assert_eq!(Money::parse("abc"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first()? {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let major: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().ok()?
        };

        let digits: Vec<i64> = fraction.bytes().map(|b| i64::from(b - b'0')).collect();
        let tens = digits.first().copied().unwrap_or(0);
        let units = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).map_or(false, |d| *d >= 5);

        let magnitude = major
            .checked_mul(MINOR_PER_MAJOR)?
            .checked_add(tens * 10 + units + i64::from(round_up))?;

        Some(Money(if negative { -magnitude } else { magnitude }))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns the value as a decimal number of major units.
    ///
    /// Only for the wire format and percentages; never feed it back into
    /// arithmetic.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
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
        Money(self.0.saturating_abs())
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(-250).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_minor(250).clamp_non_negative().minor(), 250);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates tax on this amount.
    ///
    /// ## Implementation
    /// Integer math on the magnitude: `(|amount| * bps + 5000) / 10000`.
    /// The +5000 rounds half away from zero; the sign is reapplied after.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    /// use billbook_core::types::TaxRate;
    ///
    /// let amount = Money::from_minor(20_000);     // 200.00
    /// let rate = TaxRate::from_percentage(18.0);  // 18%
    /// assert_eq!(amount.calculate_tax(rate).minor(), 3_600);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Line amount: 200.00
    ///      │
    ///      ▼
    /// calculate_tax(18%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line tax: 36.00 ──► summed into Invoice.taxTotal
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 keeps large amounts from overflowing before the division
        let magnitude = (self.0.unsigned_abs() as i128 * rate.bps() as i128 + 5000) / 10000;
        let tax = magnitude as i64;
        Money(if self.0 < 0 { -tax } else { tax })
    }

    /// Multiplies money by a (possibly fractional) quantity, rounding to the
    /// nearest minor unit. Non-finite quantities yield zero.
    ///
    /// ## Example
    /// ```rust
    /// use billbook_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(10_000); // 100.00 per kg
    /// assert_eq!(unit_price.multiply_quantity(2.5).minor(), 25_000);
    /// ```
    pub fn multiply_quantity(&self, quantity: f64) -> Money {
        if !quantity.is_finite() {
            return Money::zero();
        }
        Money((self.0 as f64 * quantity).round() as i64)
    }
}

// =============================================================================
// Serde
// =============================================================================

/// Serializes as a JSON number of major units: an integer when there is no
/// fractional part (`236`), otherwise a float (`236.5`).
impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % MINOR_PER_MAJOR == 0 {
            serializer.serialize_i64(self.major())
        } else {
            serializer.serialize_f64(self.to_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Money::from_value(&value))
    }
}

impl Money {
    /// Lenient conversion from a stored JSON value.
    pub(crate) fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Money::parse(s).unwrap_or_else(|| Money::from_decimal(lenient::number(value))),
            _ => Money::from_decimal(lenient::number(value)),
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Two decimals, no currency symbol. The CLI adds symbol and digit grouping.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

// Arithmetic saturates at the i64 bounds.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
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
    use serde_json::json;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(236.5).minor(), 23_650);
        assert_eq!(Money::from_decimal(0.1 + 0.2).minor(), 30);
        assert_eq!(Money::from_decimal(f64::INFINITY), Money::zero());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("100"), Some(Money::from_minor(10_000)));
        assert_eq!(Money::parse(" 10.5 "), Some(Money::from_minor(1_050)));
        assert_eq!(Money::parse(".75"), Some(Money::from_minor(75)));
        assert_eq!(Money::parse("1.005"), Some(Money::from_minor(101)));
        assert_eq!(Money::parse("1.004"), Some(Money::from_minor(100)));
        assert_eq!(Money::parse("-0.5"), Some(Money::from_minor(-50)));
        assert_eq!(Money::parse(""), None);
        assert_eq!(Money::parse("."), None);
        assert_eq!(Money::parse("1,000"), None);
        assert_eq!(Money::parse("12abc"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "10.99");
        assert_eq!(Money::from_minor(500).to_string(), "5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((-a).minor(), -1000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_decimal(9e16);
        let total: Money = [huge, huge].iter().sum();
        assert_eq!(total.minor(), i64::MAX);
        assert_eq!((Money::zero() - huge - huge).minor(), i64::MIN);
        assert_eq!((-Money::from_minor(i64::MIN)).minor(), i64::MAX);
    }

    #[test]
    fn test_tax_calculation() {
        let amount = Money::from_minor(20_000);
        assert_eq!(amount.calculate_tax(TaxRate::from_percentage(18.0)).minor(), 3_600);

        // 30.00 at 10% = 3.00
        let amount = Money::from_minor(3_000);
        assert_eq!(amount.calculate_tax(TaxRate::from_percentage(10.0)).minor(), 300);
    }

    #[test]
    fn test_tax_calculation_rounds_half_away_from_zero() {
        // 0.25 at 10% = 0.025 → 0.03
        let amount = Money::from_minor(25);
        let rate = TaxRate::from_percentage(10.0);
        assert_eq!(amount.calculate_tax(rate).minor(), 3);
        assert_eq!((-amount).calculate_tax(rate).minor(), -3);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_minor(299);
        assert_eq!(unit_price.multiply_quantity(3.0).minor(), 897);
        assert_eq!(unit_price.multiply_quantity(0.5).minor(), 150);
        assert_eq!(unit_price.multiply_quantity(f64::NAN), Money::zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_minor(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().minor(), 100);
        assert_eq!(negative.clamp_non_negative(), Money::zero());
    }

    #[test]
    fn test_serializes_as_major_units() {
        assert_eq!(serde_json::to_value(Money::from_minor(23_600)).unwrap(), json!(236));
        assert_eq!(serde_json::to_value(Money::from_minor(23_650)).unwrap(), json!(236.5));
        assert_eq!(serde_json::to_value(Money::from_minor(-1_250)).unwrap(), json!(-12.5));
    }

    #[test]
    fn test_lenient_decode() {
        let decode = |v: Value| serde_json::from_value::<Money>(v).unwrap();

        assert_eq!(decode(json!(236.5)).minor(), 23_650);
        assert_eq!(decode(json!(12)).minor(), 1_200);
        assert_eq!(decode(json!("99.90")).minor(), 9_990);
        assert_eq!(decode(json!("1e2")).minor(), 10_000);
        assert_eq!(decode(json!("n/a")), Money::zero());
        assert_eq!(decode(json!(null)), Money::zero());
        assert_eq!(decode(json!([1, 2])), Money::zero());
    }
}
