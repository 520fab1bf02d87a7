//! Price normalization.
//!
//! The storefront shows whole amounts without decimals (`$15`) unless asked
//! otherwise, and any amount carrying a fractional part with two decimals
//! (`$10.50`). [`fix_price`] encodes that rule.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of decimal digits for prices.
pub const PRICE_DECIMAL_DIGITS: u32 = 2;

/// Result of [`fix_price`]: either the fixed-point text or the untouched number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixedPrice {
    Text(String),
    Number(f64),
}

impl FixedPrice {
    pub fn is_text(&self) -> bool {
        matches!(self, FixedPrice::Text(_))
    }

    /// Numeric value of either form.
    pub fn as_f64(&self) -> f64 {
        match self {
            FixedPrice::Text(s) => s.parse().unwrap_or(f64::NAN),
            FixedPrice::Number(n) => *n,
        }
    }
}

impl fmt::Display for FixedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixedPrice::Text(s) => f.write_str(s),
            // `15.0` renders as `15`, `10.5` as `10.5`.
            FixedPrice::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Round `amount` to `decimal_digits` places, halves away from zero, and return it as text when
/// `force_decimal` is set or when its fractional part is longer than
/// `decimal_digits` once written out (`0.5` is three characters, so any
/// fraction qualifies for two digits). Otherwise the number is returned as is.
///
/// Non-finite input is returned unchanged.
///
/// ```
/// use storefront_core::price::{fix_price, FixedPrice};
///
/// assert_eq!(fix_price(10.0, 2, true), FixedPrice::Text("10.00".into()));
/// assert_eq!(fix_price(10.5, 2, false), FixedPrice::Text("10.50".into()));
/// assert_eq!(fix_price(10.0, 2, false), FixedPrice::Number(10.0));
/// ```
pub fn fix_price(amount: f64, decimal_digits: u32, force_decimal: bool) -> FixedPrice {
    if !amount.is_finite() {
        return FixedPrice::Number(amount);
    }

    let fraction = amount % 1.0;
    let long_fraction = fraction != 0.0 && fraction.to_string().len() > decimal_digits as usize;

    if force_decimal || long_fraction {
        let factor = 10f64.powi(decimal_digits as i32);
        let mut rounded = (amount * factor).round() / factor;
        if !rounded.is_finite() {
            rounded = amount;
        }
        FixedPrice::Text(format!("{:.*}", decimal_digits as usize, rounded))
    } else {
        FixedPrice::Number(amount)
    }
}
