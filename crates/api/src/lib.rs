//! HTTP API server for storefront checkout.
//!
//! Exposes order placement and order lookup over REST, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{Money, ProductSnapshot};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryCatalogStore, InMemoryOrderStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use identity::BearerSessionIdentity;
use state::AppState;

/// Principal of the user seeded into the demo in-memory stores.
pub const DEMO_PRINCIPAL: &str = "demo-session";

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/checkout", post(routes::checkout::place_order))
        .route("/orders/{id}", get(routes::orders::get))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds application state over in-memory stores with bearer-token identity.
pub fn create_in_memory_state(
    catalog: InMemoryCatalogStore,
    orders: InMemoryOrderStore,
) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(catalog),
        Arc::new(orders),
        Arc::new(BearerSessionIdentity),
    ))
}

/// Small catalog used when no database is configured.
pub fn demo_products() -> Vec<ProductSnapshot> {
    vec![
        ProductSnapshot::new("P1", "Organic Apples (1kg)", Money::from_cents(1000), 5),
        ProductSnapshot::new("P2", "Sourdough Loaf", Money::from_cents(450), 12),
        ProductSnapshot::new("P3", "Free-Range Eggs (12)", Money::from_cents(599), 20),
        ProductSnapshot::new("P4", "Whole Milk (2L)", Money::from_cents(289), 0),
    ]
}

/// In-memory stores seeded with [`demo_products`] and one user for
/// [`DEMO_PRINCIPAL`].
pub async fn seeded_in_memory_stores() -> (InMemoryCatalogStore, InMemoryOrderStore) {
    let catalog = InMemoryCatalogStore::with_products(demo_products());
    let orders = InMemoryOrderStore::new();
    orders.register_user(DEMO_PRINCIPAL).await;
    (catalog, orders)
}
