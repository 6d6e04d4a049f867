//! Type-safe price representation using decimal arithmetic.
//!
//! The shop sells in a single currency (Indian rupees), so a price is just a
//! non-negative decimal amount. The backend transports prices as JSON
//! numbers; conversion to and from `f64` happens only at that boundary.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Currency symbol used when formatting prices.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The input is not a number.
    #[error("price is not a valid number: {0}")]
    Invalid(String),
}

/// A non-negative price in the shop currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from a floating point amount (backend wire format).
    ///
    /// # Errors
    ///
    /// Returns an error for NaN, infinities and negative amounts.
    pub fn from_f64(amount: f64) -> Result<Self, PriceError> {
        let decimal =
            Decimal::try_from(amount).map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(decimal)
    }

    /// Parse a user-entered price such as `"499"` or `"12.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        let decimal =
            Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;
        Self::new(decimal)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as `f64` for the backend wire format.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// The amount with two decimal places and no currency symbol (form inputs).
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{:.2}", self.0.round_dp(2))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::parse("499").unwrap().to_string(), "₹499.00");
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "₹12.50");
        assert_eq!(Price::parse("0.125").unwrap().plain(), "0.12");
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::parse("-1"), Err(PriceError::Negative));
        assert_eq!(Price::from_f64(-0.5), Err(PriceError::Negative));
    }

    #[test]
    fn test_invalid_rejected() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse(""), Err(PriceError::Invalid(_))));
        assert!(Price::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_f64_boundary() {
        let price = Price::from_f64(349.99).unwrap();
        assert_eq!(price.to_string(), "₹349.99");
        assert!((price.to_f64() - 349.99).abs() < 1e-9);
    }
}
