//! Checkout error types.

use common::OrderId;
use domain::{DomainError, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors that can end a checkout attempt.
///
/// The first four variants are detected before any write. The write-phase
/// variants are only returned after the attempt's own writes were compensated.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No principal, or the principal has no user record.
    #[error("Authentication required")]
    Unauthenticated,

    /// Empty cart, missing delivery slot, or an unusable quantity.
    #[error("Invalid checkout request: {0}")]
    InvalidInput(String),

    /// Quantities times prices do not fit in the money range.
    #[error("Invalid checkout request: {0}")]
    AmountOutOfRange(#[from] DomainError),

    /// A cart line names a product the catalog does not know.
    #[error("Product {product_id} is not available")]
    ProductUnavailable { product_id: ProductId },

    /// A cart line asks for more than the catalog has.
    #[error(
        "Insufficient stock for {product_name} ({product_id}): available {available}, requested {requested}"
    )]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: u32,
        requested: u32,
    },

    /// Writing the line items failed; the order header was deleted.
    #[error("Failed to save items for order {order_id}: {reason}")]
    OrderPersistenceFailed { order_id: OrderId, reason: String },

    /// A guarded stock decrement failed; the order and its items were deleted.
    #[error("Failed to update stock for product {product_id}: {reason}")]
    StockUpdateFailed {
        product_id: ProductId,
        reason: String,
    },

    /// Any other datastore failure.
    #[error("Store error: {0}")]
    Transport(#[from] StoreError),
}

impl CheckoutError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutError::Unauthenticated => "unauthenticated",
            CheckoutError::InvalidInput(_) => "invalid_input",
            CheckoutError::AmountOutOfRange(_) => "amount_out_of_range",
            CheckoutError::ProductUnavailable { .. } => "product_unavailable",
            CheckoutError::InsufficientStock { .. } => "insufficient_stock",
            CheckoutError::OrderPersistenceFailed { .. } => "order_persistence_failed",
            CheckoutError::StockUpdateFailed { .. } => "stock_update_failed",
            CheckoutError::Transport(_) => "transport",
        }
    }

    /// Returns true if the request was rejected before any write.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CheckoutError::Unauthenticated
                | CheckoutError::InvalidInput(_)
                | CheckoutError::AmountOutOfRange(_)
                | CheckoutError::ProductUnavailable { .. }
                | CheckoutError::InsufficientStock { .. }
        )
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_product() {
        let err = CheckoutError::InsufficientStock {
            product_id: ProductId::new("P1"),
            product_name: "Widget".to_string(),
            available: 5,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Widget (P1): available 5, requested 10"
        );
    }

    #[test]
    fn test_rejections_versus_write_failures() {
        assert!(CheckoutError::Unauthenticated.is_rejection());
        assert!(CheckoutError::InvalidInput("empty".into()).is_rejection());
        assert!(CheckoutError::from(DomainError::AmountOverflow("order total")).is_rejection());
        assert!(
            !CheckoutError::StockUpdateFailed {
                product_id: ProductId::new("P1"),
                reason: "gone".into(),
            }
            .is_rejection()
        );
        assert!(!CheckoutError::Transport(StoreError::Unavailable("down".into())).is_rejection());
    }
}
