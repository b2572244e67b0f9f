use domain::DomainError;
use thiserror::Error;

/// Errors that can occur when talking to the catalog or order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be decoded into a domain value.
    #[error("Corrupt row: {0}")]
    Corrupt(#[from] DomainError),

    /// A value does not fit the column it is stored in.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// The store could not be reached or refused the call.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
