//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues when summing cart lines. The API sends amounts as decimal
//! strings (`"19.99"`) or plain numbers; both parse into cents at the serde
//! boundary and serialize back as decimal strings.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::price::{fix_price, FixedPrice, PRICE_DECIMAL_DIGITS};

/// A monetary amount in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    pub amount_cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { amount_cents: 0 };

    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use storefront_core::Money;
    /// assert_eq!(Money::from_decimal(49.99).amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::new((amount * 100.0).round() as i64)
    }

    /// Parse a decimal string such as `"19.99"`. Empty input is zero.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Some(Self::ZERO);
        }
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::from_decimal)
    }

    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    /// Normalize for display, see [`fix_price`].
    pub fn fixed(&self, force_decimal: bool) -> FixedPrice {
        fix_price(self.to_decimal(), PRICE_DECIMAL_DIGITS, force_decimal)
    }

    /// Format with a currency symbol, always with two decimals (e.g. `"$49.99"`).
    pub fn display_with(&self, symbol: &str) -> String {
        format!("{}{}", symbol, self.fixed(true))
    }

    /// Multiply by a quantity.
    pub fn multiply(&self, factor: i64) -> Money {
        Money::new(self.amount_cents.saturating_mul(factor))
    }

    /// Sum an iterator of Money values.
    pub fn sum<'a>(iter: impl Iterator<Item = &'a Money>) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount_cents.saturating_add(other.amount_cents))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::new(self.amount_cents.saturating_sub(other.amount_cents))
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        self.multiply(factor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fixed(true))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.fixed(true).to_string())
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::new(v.saturating_mul(100)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money::new(i64::try_from(v).unwrap_or(i64::MAX).saturating_mul(100)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if v.is_finite() {
            Ok(Money::from_decimal(v))
        } else {
            Err(E::custom("non-finite amount"))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99).amount_cents, 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).amount_cents, 30);
    }

    #[test]
    fn test_money_parse() {
        assert_eq!(Money::parse("19.99"), Some(Money::new(1999)));
        assert_eq!(Money::parse(" 5 "), Some(Money::new(500)));
        assert_eq!(Money::parse(""), Some(Money::ZERO));
        assert_eq!(Money::parse("abc"), None);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(1000);
        let b = Money::new(250);
        assert_eq!((a + b).amount_cents, 1250);
        assert_eq!((a - b).amount_cents, 750);
        assert_eq!((b * 3).amount_cents, 750);
        assert_eq!(Money::sum([a, b].iter()).amount_cents, 1250);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999).display_with("$"), "$49.99");
        assert_eq!(Money::new(1500).to_string(), "15.00");
        assert_eq!(Money::new(1500).fixed(false).to_string(), "15");
    }

    #[test]
    fn test_money_deserializes_numbers_and_strings() {
        let values: Vec<Money> = serde_json::from_str(r#"["12.50", 3, 0.99, ""]"#).unwrap();
        assert_eq!(
            values,
            vec![Money::new(1250), Money::new(300), Money::new(99), Money::ZERO]
        );
        assert!(serde_json::from_str::<Money>(r#""twelve""#).is_err());
    }

    #[test]
    fn test_money_serializes_as_decimal_string() {
        assert_eq!(serde_json::to_string(&Money::new(705)).unwrap(), "\"7.05\"");
    }
}
