//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use checkout::{CheckoutError, CheckoutRequest};
use domain::CartLine;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;
use crate::identity::CurrentPrincipal;
use crate::routes::orders::OrderResponse;
use crate::state::AppState;

// -- Request types --

/// Body posted by the storefront.
///
/// Cart items carry display fields (name, price, image...) that are ignored;
/// only `id` and `quantity` are read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    #[serde(default)]
    pub cart_items: Vec<CartItemBody>,
    #[serde(default)]
    pub delivery_slot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartItemBody {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub quantity: u32,
}

/// Product ids arrive as JSON strings or numbers depending on the client.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: OrderResponse,
    pub message: String,
}

// -- Handlers --

/// POST /checkout - place an order for the submitted cart.
#[tracing::instrument(skip(state, principal, body))]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    body: Result<Json<CheckoutBody>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    // Identity is checked before the body so anonymous callers always get 401.
    if principal.is_none() {
        return Err(CheckoutError::Unauthenticated.into());
    }
    let Json(body) = body?;

    let request = CheckoutRequest {
        principal,
        lines: body
            .cart_items
            .into_iter()
            .map(|item| CartLine::new(item.id, item.quantity))
            .collect(),
        delivery_slot_id: body.delivery_slot_id,
    };

    let receipt = state.coordinator.place_order(request).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        order: OrderResponse::new(&receipt.order, &receipt.line_items),
        message: receipt.message,
    }))
}
