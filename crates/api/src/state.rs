//! Shared application state.

use std::sync::Arc;

use checkout::CheckoutCoordinator;
use store::{CatalogStore, OrderStore};

use crate::identity::IdentityProvider;

/// Catalog store shared by handlers.
pub type SharedCatalog = Arc<dyn CatalogStore>;

/// Order store shared by handlers.
pub type SharedOrders = Arc<dyn OrderStore>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub coordinator: CheckoutCoordinator<SharedCatalog, SharedOrders>,
    pub orders: SharedOrders,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(
        catalog: SharedCatalog,
        orders: SharedOrders,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            coordinator: CheckoutCoordinator::new(catalog, orders.clone()),
            orders,
            identity,
        }
    }
}
