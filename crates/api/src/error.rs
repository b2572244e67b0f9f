//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// No authenticated principal, or no user behind it.
    Unauthorized,
    /// Checkout failure.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, "internal server error");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CheckoutError::InvalidInput(_)
        | CheckoutError::AmountOutOfRange(_)
        | CheckoutError::ProductUnavailable { .. }
        | CheckoutError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        CheckoutError::OrderPersistenceFailed { .. }
        | CheckoutError::StockUpdateFailed { .. }
        | CheckoutError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Checkout(CheckoutError::InvalidInput(rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ProductId;

    fn status_of(err: CheckoutError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_checkout_error_statuses() {
        assert_eq!(
            status_of(CheckoutError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CheckoutError::InvalidInput("empty".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(domain::DomainError::AmountOverflow("order total").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CheckoutError::ProductUnavailable {
                product_id: ProductId::new("P1")
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CheckoutError::InsufficientStock {
                product_id: ProductId::new("P1"),
                product_name: "Widget".into(),
                available: 1,
                requested: 2,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CheckoutError::OrderPersistenceFailed {
                order_id: common::OrderId::new(),
                reason: "down".into(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CheckoutError::StockUpdateFailed {
                product_id: ProductId::new("P1"),
                reason: "gone".into(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CheckoutError::Transport(StoreError::Unavailable("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
