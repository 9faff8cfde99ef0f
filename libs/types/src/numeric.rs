//! Fixed-point decimal type for monetary amounts
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! All bid and asking-price amounts are strictly positive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A strictly positive monetary amount (ETH-denominated in practice)
///
/// Construction validates positivity once, so downstream code can rely on
/// `Amount` values being comparable without re-checking sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an Amount, rejecting zero and negative values
    pub fn try_new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Parse from a decimal string (e.g. "0.65")
    pub fn from_str_checked(s: &str) -> Result<Self, AmountError> {
        let value = Decimal::from_str(s).map_err(|_| AmountError::Unparseable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Get the inner decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amount construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount must be positive, got {0}")]
    NotPositive(Decimal),

    #[error("unparseable amount: {0}")]
    Unparseable(String),
}
