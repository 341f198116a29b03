use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ValidationError};

/// Currency-tagged decimal amount. Immutable; arithmetic returns new values
/// and refuses to mix currencies or go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Result<Self, ValidationError> {
        if currency.trim().is_empty() {
            return Err(ValidationError::new("currency", "must not be empty"));
        }
        if amount < Decimal::ZERO {
            return Err(ValidationError::new("amount", "must not be negative"));
        }
        Ok(Self {
            amount,
            currency: currency.to_string(),
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        self.check_currency(other)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Subtracts `other`, failing with `INSUFFICIENT_FUNDS` if the result
    /// would be negative.
    pub fn subtract(&self, other: &Money) -> Result<Money, DomainError> {
        self.check_currency(other)?;
        if self.amount < other.amount {
            return Err(DomainError::InsufficientFunds {
                required: other.amount,
                available: self.amount,
            });
        }
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    pub fn covers(&self, other: &Money) -> Result<bool, DomainError> {
        self.check_currency(other)?;
        Ok(self.amount >= other.amount)
    }

    fn check_currency(&self, other: &Money) -> Result<(), DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
