//! Amount type for handling monetary values with optional dollar signs.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may or may not include a dollar sign and commas.

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// The largest amount accepted from user input: one trillion dollars.
const MAX_INPUT_DOLLARS: i64 = 1_000_000_000_000;

/// Represents a dollar amount.
///
/// Values are exact decimals; no floating point is involved in storage or arithmetic. Display
/// always uses a dollar sign, thousands separators and two decimal places, while serialization
/// writes the plain decimal so nothing is lost on a round-trip.
///
/// # Examples
///
/// ```
/// # use txtrack::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "$1,250.50");
/// assert_eq!(serde_json::to_string(&amount).unwrap(), "\"1250.5\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);
    pub const MAX: Amount = Amount(Decimal::MAX);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Parses `s` and requires the result to be greater than zero and at most one trillion
    /// dollars. This is the validation applied to user input before a transaction is logged.
    pub fn parse_positive(s: &str) -> std::result::Result<Self, AmountError> {
        let amount = Amount::from_str(s)?;
        if !amount.is_positive() {
            return Err(AmountError::NotPositive(s.trim().to_string()));
        }
        if amount.0 > Decimal::from(MAX_INPUT_DOLLARS) {
            return Err(AmountError::TooLarge(s.trim().to_string()));
        }
        Ok(amount)
    }

    /// Returns `None` instead of overflowing.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub enum AmountError {
    Empty,
    Invalid(rust_decimal::Error),
    NotPositive(String),
    TooLarge(String),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("Empty"),
            AmountError::Invalid(e) => Debug::fmt(e, f),
            AmountError::NotPositive(s) => write!(f, "NotPositive({s:?})"),
            AmountError::TooLarge(s) => write!(f, "TooLarge({s:?})"),
        }
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => f.write_str("An amount is required"),
            AmountError::Invalid(e) => Display::fmt(e, f),
            AmountError::NotPositive(s) => {
                write!(f, "The amount must be greater than zero, got '{s}'")
            }
            AmountError::TooLarge(s) => {
                write!(f, "The amount must be at most $1,000,000,000,000.00, got '{s}'")
            }
        }
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AmountError::Invalid(e) => Some(e),
            _ => None,
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // "-$50.00", "$50.00", "-50.00" and "50.00" are all accepted
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
            after_dollar.to_string()
        } else {
            trimmed.to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError::Invalid)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.0.is_sign_negative() && !self.is_zero() {
            "-"
        } else {
            ""
        };
        let fixed = format!("{:.2}", self.0.abs().round_dp(2));
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "{sign}${grouped}.{cents}")
    }
}

// Saturates at `Amount::MAX` rather than panicking.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts decimal strings as well as JSON numbers. Older snapshots stored amounts as floating
/// point numbers.
struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or a number")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        // Go through the shortest round-trip representation so that 0.1 stays 0.1.
        Decimal::from_str(&v.to_string())
            .map(Amount)
            .map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_without_dollar_sign() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
    }

    #[test]
    fn test_parse_whitespace() {
        let amount = Amount::from_str("  $50.00  ").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_empty_string_is_an_error() {
        assert!(matches!(Amount::from_str("  "), Err(AmountError::Empty)));
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(matches!(Amount::from_str("abc"), Err(AmountError::Invalid(_))));
    }

    #[test]
    fn test_parse_multiple_commas() {
        let amount = Amount::from_str("$1,234,567.89").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(
            Amount::parse_positive("20").unwrap().value(),
            Decimal::from(20)
        );
        assert!(matches!(
            Amount::parse_positive("0.00"),
            Err(AmountError::NotPositive(_))
        ));
        assert!(matches!(
            Amount::parse_positive("-$5"),
            Err(AmountError::NotPositive(_))
        ));
        assert!(Amount::parse_positive("twenty").is_err());
    }

    #[test]
    fn test_parse_positive_upper_bound() {
        assert!(Amount::parse_positive("$1,000,000,000,000").is_ok());
        assert!(matches!(
            Amount::parse_positive("1000000000000.01"),
            Err(AmountError::TooLarge(_))
        ));
        let err = Amount::parse_positive("79228162514264337593543950335").unwrap_err();
        assert!(matches!(err, AmountError::TooLarge(_)));
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_add_saturates() {
        let sum = Amount::MAX + Amount::new(dec("1"));
        assert_eq!(sum, Amount::MAX);
        let mut acc = Amount::MAX;
        acc += Amount::MAX;
        assert_eq!(acc, Amount::MAX);
        assert_eq!(Amount::MAX.checked_add(Amount::new(dec("0.01"))), None);
        assert_eq!(
            Amount::new(dec("1")).checked_add(Amount::new(dec("2"))),
            Some(Amount::new(dec("3")))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(dec("50")).to_string(), "$50.00");
        assert_eq!(Amount::new(dec("1234.5")).to_string(), "$1,234.50");
        assert_eq!(Amount::new(dec("-60000")).to_string(), "-$60,000.00");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
        assert_eq!(Amount::new(dec("0.5")).to_string(), "$0.50");
        assert_eq!(Amount::new(dec("999.999")).to_string(), "$1,000.00");
    }

    #[test]
    fn test_display_is_exact_for_large_values() {
        assert_eq!(
            Amount::new(dec("9007199254740993.01")).to_string(),
            "$9,007,199,254,740,993.01"
        );
        assert_eq!(
            Amount::MAX.to_string(),
            "$79,228,162,514,264,337,593,543,950,335.00"
        );
    }

    #[test]
    fn test_serialize_is_exact() {
        let amount = Amount::new(dec("19.999"));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"19.999\"");
    }

    #[test]
    fn test_deserialize_string_and_numbers() {
        let a: Amount = serde_json::from_str("\"$50.25\"").unwrap();
        assert_eq!(a.value(), dec("50.25"));
        let b: Amount = serde_json::from_str("50").unwrap();
        assert_eq!(b.value(), dec("50"));
        let c: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(c.value(), dec("0.1"));
    }

    #[test]
    fn test_sum_has_no_rounding_drift() {
        let total: Amount = std::iter::repeat(Amount::new(dec("0.1"))).take(10).sum();
        assert_eq!(total.value(), dec("1.0"));
    }

    #[test]
    fn test_ordering() {
        let a1 = Amount::from_str("$30.00").unwrap();
        let a2 = Amount::from_str("$50.00").unwrap();
        assert!(a1 < a2);
    }
}
