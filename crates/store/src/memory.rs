use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PrincipalId, UserId};
use domain::{Order, OrderLineItem, ProductId, ProductSnapshot};
use tokio::sync::{Barrier, RwLock};

use crate::{
    Result, StoreError,
    store::{CatalogStore, OrderStore, StockDecrement},
};

#[derive(Debug, Default)]
struct CatalogFaults {
    fail_on_read: bool,
    fail_decrement_for: HashSet<ProductId>,
    drain_before_decrement: HashSet<ProductId>,
    read_barrier: Option<Arc<Barrier>>,
}

/// In-memory catalog store for testing and local runs.
///
/// The guarded decrement checks and writes under a single write lock, so it
/// is atomic with respect to concurrent checkouts sharing the same store.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    products: Arc<RwLock<HashMap<ProductId, ProductSnapshot>>>,
    faults: Arc<RwLock<CatalogFaults>>,
    decrement_calls: Arc<RwLock<usize>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog pre-populated with the given products.
    pub fn with_products(products: impl IntoIterator<Item = ProductSnapshot>) -> Self {
        let map = products
            .into_iter()
            .map(|p| (p.product_id.clone(), p))
            .collect();
        Self {
            products: Arc::new(RwLock::new(map)),
            ..Self::default()
        }
    }

    /// Inserts or replaces a product.
    pub async fn upsert_product(&self, product: ProductSnapshot) {
        self.products
            .write()
            .await
            .insert(product.product_id.clone(), product);
    }

    /// Returns the current stock of a product.
    pub async fn stock(&self, product_id: &ProductId) -> Option<u32> {
        self.products
            .read()
            .await
            .get(product_id)
            .map(|p| p.available_stock)
    }

    /// Returns how many decrement calls reached the store.
    pub async fn decrement_calls(&self) -> usize {
        *self.decrement_calls.read().await
    }

    /// Configures product reads to fail.
    pub async fn set_fail_on_read(&self, fail: bool) {
        self.faults.write().await.fail_on_read = fail;
    }

    /// Configures decrements of `product_id` to fail with a transport error.
    pub async fn set_fail_on_decrement(&self, product_id: impl Into<ProductId>) {
        self.faults
            .write()
            .await
            .fail_decrement_for
            .insert(product_id.into());
    }

    /// Simulates a concurrent checkout that takes all remaining stock of
    /// `product_id` immediately before the next decrement of it.
    pub async fn set_drain_before_decrement(&self, product_id: impl Into<ProductId>) {
        self.faults
            .write()
            .await
            .drain_before_decrement
            .insert(product_id.into());
    }

    /// Makes every product read wait, after taking its snapshot, until
    /// `readers` reads are in flight. Lets tests line up checkouts so they
    /// all validate against the same stock before any of them writes.
    pub async fn set_read_barrier(&self, readers: usize) {
        self.faults.write().await.read_barrier = Some(Arc::new(Barrier::new(readers)));
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get_products(&self, ids: &[ProductId]) -> Result<Vec<ProductSnapshot>> {
        let barrier = {
            let faults = self.faults.read().await;
            if faults.fail_on_read {
                return Err(StoreError::Unavailable("catalog read failed".to_string()));
            }
            faults.read_barrier.clone()
        };

        let snapshots: Vec<ProductSnapshot> = {
            let products = self.products.read().await;
            let mut seen = HashSet::new();
            ids.iter()
                .filter(|id| seen.insert(*id))
                .filter_map(|id| products.get(id).cloned())
                .collect()
        };

        // No lock is held while waiting.
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        Ok(snapshots)
    }

    async fn decrement_stock(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<StockDecrement> {
        *self.decrement_calls.write().await += 1;

        let drain = {
            let mut faults = self.faults.write().await;
            if faults.fail_decrement_for.contains(product_id) {
                return Err(StoreError::Unavailable(format!(
                    "stock update for {product_id} failed"
                )));
            }
            faults.drain_before_decrement.remove(product_id)
        };

        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(product_id) else {
            return Ok(StockDecrement::Insufficient);
        };

        if drain {
            product.available_stock = 0;
        }

        if product.available_stock < quantity {
            return Ok(StockDecrement::Insufficient);
        }

        product.available_stock -= quantity;
        Ok(StockDecrement::Applied {
            remaining: product.available_stock,
        })
    }
}

#[derive(Debug, Default)]
struct OrderFaults {
    fail_on_find_user: bool,
    fail_on_insert_order: bool,
    fail_on_insert_items: bool,
    fail_on_delete_items: bool,
    fail_on_delete_order: bool,
}

#[derive(Debug, Default)]
struct OrderTables {
    users: HashMap<PrincipalId, UserId>,
    orders: HashMap<OrderId, Order>,
    items: Vec<OrderLineItem>,
}

/// In-memory order store for testing and local runs.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    tables: Arc<RwLock<OrderTables>>,
    faults: Arc<RwLock<OrderFaults>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user record for `principal` and returns its id.
    pub async fn register_user(&self, principal: impl Into<PrincipalId>) -> UserId {
        let user_id = UserId::new();
        self.tables
            .write()
            .await
            .users
            .insert(principal.into(), user_id);
        user_id
    }

    /// Returns the total number of order headers stored.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Returns the total number of line items stored, across all orders.
    pub async fn line_item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    pub async fn set_fail_on_find_user(&self, fail: bool) {
        self.faults.write().await.fail_on_find_user = fail;
    }

    pub async fn set_fail_on_insert_order(&self, fail: bool) {
        self.faults.write().await.fail_on_insert_order = fail;
    }

    pub async fn set_fail_on_insert_items(&self, fail: bool) {
        self.faults.write().await.fail_on_insert_items = fail;
    }

    /// Configures both compensating deletes to fail.
    pub async fn set_fail_on_delete(&self, fail: bool) {
        let mut faults = self.faults.write().await;
        faults.fail_on_delete_items = fail;
        faults.fail_on_delete_order = fail;
    }

    /// Configures only the line-item delete to fail.
    pub async fn set_fail_on_delete_items(&self, fail: bool) {
        self.faults.write().await.fail_on_delete_items = fail;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_user_id(&self, principal: &PrincipalId) -> Result<Option<UserId>> {
        if self.faults.read().await.fail_on_find_user {
            return Err(StoreError::Unavailable("user lookup failed".to_string()));
        }
        Ok(self.tables.read().await.users.get(principal).copied())
    }

    async fn insert_order(&self, order: &Order) -> Result<()> {
        if self.faults.read().await.fail_on_insert_order {
            return Err(StoreError::Unavailable("order insert failed".to_string()));
        }
        self.tables
            .write()
            .await
            .orders
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn insert_line_items(&self, items: &[OrderLineItem]) -> Result<()> {
        if self.faults.read().await.fail_on_insert_items {
            return Err(StoreError::Unavailable(
                "order item insert failed".to_string(),
            ));
        }
        self.tables.write().await.items.extend_from_slice(items);
        Ok(())
    }

    async fn delete_line_items(&self, order_id: OrderId) -> Result<()> {
        if self.faults.read().await.fail_on_delete_items {
            return Err(StoreError::Unavailable(
                "order item delete failed".to_string(),
            ));
        }
        self.tables
            .write()
            .await
            .items
            .retain(|item| item.order_id != order_id);
        Ok(())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        if self.faults.read().await.fail_on_delete_order {
            return Err(StoreError::Unavailable("order delete failed".to_string()));
        }
        // Line items go with their order, like the ON DELETE CASCADE key.
        let mut tables = self.tables.write().await;
        tables.orders.remove(&order_id);
        tables.items.retain(|item| item.order_id != order_id);
        Ok(())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables.read().await.orders.get(&order_id).cloned())
    }

    async fn get_line_items(&self, order_id: OrderId) -> Result<Vec<OrderLineItem>> {
        Ok(self
            .tables
            .read()
            .await
            .items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }
}
