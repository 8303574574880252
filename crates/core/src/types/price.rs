//! Type-safe price representation using decimal arithmetic.
//!
//! Every amount in the portal is a [`Decimal`]; catalog prices arrive as
//! strings (`"129.95"`) and are parsed once at the boundary.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., euros, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a euro price.
    #[must_use]
    pub const fn eur(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::EUR)
    }

    /// Parse a decimal string as sent by the catalog source.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Malformed`] if the string is not a decimal number,
    /// or [`PriceError::Negative`] for amounts below zero.
    pub fn parse(amount: &str, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        let trimmed = amount.trim();
        let value = Decimal::from_str(trimmed)
            .map_err(|_| PriceError::Malformed(trimmed.to_owned()))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PriceError::Negative(trimmed.to_owned()));
        }
        Ok(Self::new(value, currency_code))
    }

    /// Format for display (e.g., "€19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{}", self.currency_code.symbol(), format_amount(self.amount))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Errors from parsing a price amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("malformed price amount: {0:?}")]
    Malformed(String),

    #[error("negative price amount: {0}")]
    Negative(String),
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// ISO code as a string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::EUR),
            "USD" => Ok(Self::USD),
            "GBP" => Ok(Self::GBP),
            _ => Err(format!("unsupported currency: {s}")),
        }
    }
}

/// Round a money amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with exactly two decimals (`150` -> `"150.00"`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_catalog_string() {
        let price = Price::parse("129.95", CurrencyCode::EUR).unwrap();
        assert_eq!(price.amount, dec("129.95"));
        assert_eq!(price.display(), "€129.95");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Price::parse("12,50", CurrencyCode::EUR),
            Err(PriceError::Malformed(_))
        ));
        assert!(matches!(
            Price::parse("NaN", CurrencyCode::EUR),
            Err(PriceError::Malformed(_))
        ));
        assert!(matches!(
            Price::parse("-1.00", CurrencyCode::EUR),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
    }

    #[test]
    fn test_format_amount_pads_decimals() {
        assert_eq!(format_amount(dec("150")), "150.00");
        assert_eq!(format_amount(dec("54.6")), "54.60");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("eur".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
