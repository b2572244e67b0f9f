use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PrincipalId, UserId};
use domain::{Order, OrderLineItem, ProductId, ProductSnapshot};

use crate::Result;

/// Outcome of a guarded stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was decremented; `remaining` is the stock left afterwards.
    Applied { remaining: u32 },
    /// The guard `stock >= quantity` did not hold (or the product is gone).
    /// Stock was left unchanged.
    Insufficient,
}

impl StockDecrement {
    pub fn is_applied(&self) -> bool {
        matches!(self, StockDecrement::Applied { .. })
    }
}

/// Read access to product data plus the guarded stock decrement.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches snapshots for the given products.
    ///
    /// Unknown ids are simply absent from the result. Duplicate ids in the
    /// input yield a single snapshot.
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<ProductSnapshot>>;

    /// Atomically decrements stock by `quantity` if and only if the current
    /// stock is at least `quantity`.
    ///
    /// This must be a single conditional update at the datastore, never a
    /// read followed by a write.
    async fn decrement_stock(&self, product_id: &ProductId, quantity: u32)
    -> Result<StockDecrement>;
}

/// Order headers, order line items, and the principal-to-user lookup.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Maps an authenticated principal to an internal user record.
    ///
    /// Returns None if the principal has no user record.
    async fn find_user_id(&self, principal: &PrincipalId) -> Result<Option<UserId>>;

    /// Inserts an order header.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Inserts all line items in a single batch.
    async fn insert_line_items(&self, items: &[OrderLineItem]) -> Result<()>;

    /// Deletes every line item belonging to `order_id`.
    async fn delete_line_items(&self, order_id: OrderId) -> Result<()>;

    /// Hard-deletes an order header.
    async fn delete_order(&self, order_id: OrderId) -> Result<()>;

    /// Loads an order header by id.
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Loads the line items of an order, in insertion order.
    async fn get_line_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>>;
}

#[async_trait]
impl<T: CatalogStore + ?Sized> CatalogStore for Arc<T> {
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<ProductSnapshot>> {
        (**self).get_products(ids).await
    }

    async fn decrement_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<StockDecrement> {
        (**self).decrement_stock(product_id, quantity).await
    }
}

#[async_trait]
impl<T: OrderStore + ?Sized> OrderStore for Arc<T> {
    async fn find_user_id(&self, principal: &PrincipalId) -> Result<Option<UserId>> {
        (**self).find_user_id(principal).await
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        (**self).insert_order(order).await
    }

    async fn insert_line_items(&self, items: &[OrderLineItem]) -> Result<()> {
        (**self).insert_line_items(items).await
    }

    async fn delete_line_items(&self, order_id: OrderId) -> Result<()> {
        (**self).delete_line_items(order_id).await
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        (**self).delete_order(order_id).await
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        (**self).get_order(order_id).await
    }

    async fn get_line_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        (**self).get_line_items(order_id).await
    }
}
