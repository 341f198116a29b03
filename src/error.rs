use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::bet::BetStatus;

/// Input failed local shape/range validation. Never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("validation failed for {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Business-rule violations. Surfaced to callers as 4xx, never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("account {account_id} is inactive")]
    AccountInactive { account_id: String },

    #[error("bet {bet_id} cannot be settled from status {current_status}")]
    BetCannotSettle {
        bet_id: Uuid,
        current_status: BetStatus,
    },

    #[error("bet {bet_id} cannot be cancelled from status {current_status}")]
    BetCannotCancel {
        bet_id: Uuid,
        current_status: BetStatus,
    },

    #[error("bet {bet_id} cannot be voided from status {current_status}")]
    BetCannotVoid {
        bet_id: Uuid,
        current_status: BetStatus,
    },

    #[error("bet {bet_id} not found")]
    BetNotFound { bet_id: String },

    #[error("bet {bet_id} is already settled")]
    BetAlreadySettled { bet_id: Uuid },

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("pending wager mismatch: reserved {reserved}, requested {requested}")]
    PendingWagerMismatch {
        reserved: Decimal,
        requested: Decimal,
    },
}

impl DomainError {
    /// Machine-readable code, stable across releases. The HTTP layer maps
    /// these to status codes.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            DomainError::AccountInactive { .. } => "ACCOUNT_INACTIVE",
            DomainError::BetCannotSettle { .. } => "BET_CANNOT_SETTLE",
            DomainError::BetCannotCancel { .. } => "BET_CANNOT_CANCEL",
            DomainError::BetCannotVoid { .. } => "BET_CANNOT_VOID",
            DomainError::BetNotFound { .. } => "BET_NOT_FOUND",
            DomainError::BetAlreadySettled { .. } => "BET_ALREADY_SETTLED",
            DomainError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            DomainError::PendingWagerMismatch { .. } => "PENDING_WAGER_MISMATCH",
        }
    }
}

/// Failures raised by the external protocol adapter. Error category is carried
/// in the variant, never inferred from message text.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("request to {endpoint} failed with status {status}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("network error calling {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("request to {endpoint} failed after {attempts} attempts: {message}")]
    Exhausted {
        endpoint: String,
        attempts: u32,
        message: String,
    },
}

impl AdapterError {
    /// Transient failures are retried by the adapter's backoff loop;
    /// not-found and malformed responses are terminal on the first attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::Http { .. }
            | AdapterError::Timeout { .. }
            | AdapterError::Network { .. }
            | AdapterError::Authentication(_) => true,
            AdapterError::NotFound { .. }
            | AdapterError::Decode { .. }
            | AdapterError::Exhausted { .. } => false,
        }
    }
}

/// Umbrella error for gateway and application-layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
