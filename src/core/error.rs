//! Lease calculation error types

use thiserror::Error;

/// Errors raised by lease measurement and scheduling
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeaseError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payments list cannot be empty")]
    EmptyPayments,

    #[error("Discount rate cannot be negative")]
    NegativeRate,

    #[error("Payments list length ({payments}) must match lease term ({term_months})")]
    TermMismatch { payments: usize, term_months: u32 },

    #[error("ROU asset must be positive (got {0:.2})")]
    InvalidAsset(f64),

    #[error("{0}")]
    InvalidResidual(String),

    #[error("Invalid modification: {0}")]
    InvalidModification(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias for lease calculations
pub type LeaseResult<T> = Result<T, LeaseError>;
