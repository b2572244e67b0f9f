//! Order lookup for the order confirmation page.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use domain::{Order, OrderLineItem};
use serde::Serialize;

use crate::error::ApiError;
use crate::identity::CurrentPrincipal;
use crate::state::AppState;

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    /// Decimal amount, e.g. `"20.00"`.
    pub total_amount: String,
    pub total_cents: i64,
    pub status: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl OrderResponse {
    pub fn new(order: &Order, items: &[OrderLineItem]) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            total_amount: order.total_amount.to_decimal_string(),
            total_cents: order.total_amount.cents(),
            status: order.status.to_string(),
            created_at: order.created_at.to_rfc3339(),
            items: items
                .iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
        }
    }
}

// -- Handlers --

/// GET /orders/{id} - the caller's own order with its line items.
#[tracing::instrument(skip(state, principal))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let principal = principal.ok_or(ApiError::Unauthorized)?;
    let user_id = state
        .orders
        .find_user_id(&principal)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let order_id = parse_order_id(&id)?;

    // Someone else's order is indistinguishable from a missing one.
    let order = state
        .orders
        .get_order(order_id)
        .await?
        .filter(|order| order.user_id == user_id)
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    let items = state.orders.get_line_items(order_id).await?;

    Ok(Json(OrderResponse::new(&order, &items)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID format: {e}")))?;
    Ok(OrderId::from(uuid))
}
