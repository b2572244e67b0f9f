//! Domain error types.

use thiserror::Error;

/// Errors that can occur when building or decoding domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A persisted status string did not match any known order status.
    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// A monetary computation exceeded the representable range.
    #[error("Amount overflow while computing {0}")]
    AmountOverflow(&'static str),
}
