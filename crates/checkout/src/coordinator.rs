//! Checkout coordinator: validation, pricing, three-phase write, rollback.

use common::{PrincipalId, UserId};
use domain::{CartLine, Order, OrderLineItem, ProductId};
use store::{CatalogStore, OrderStore, StockDecrement};

use crate::error::{CheckoutError, Result};
use crate::pricing;
use crate::saga::{CheckoutSaga, CheckoutStep, CompensationAction};

/// Everything a checkout needs from the incoming request.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Principal resolved by the identity provider, if any.
    pub principal: Option<PrincipalId>,
    /// Cart lines in the order the client submitted them.
    pub lines: Vec<CartLine>,
    /// Selected delivery slot. Must be present; not interpreted further.
    pub delivery_slot_id: Option<String>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order: Order,
    pub line_items: Vec<OrderLineItem>,
    pub message: String,
}

/// Orchestrates order placement.
///
/// The coordinator is stateless across requests and holds no locks. The
/// guarded stock decrement in the catalog store is the only synchronization
/// between concurrent checkouts of the same product.
pub struct CheckoutCoordinator<C, O>
where
    C: CatalogStore,
    O: OrderStore,
{
    catalog: C,
    orders: O,
}

impl<C, O> CheckoutCoordinator<C, O>
where
    C: CatalogStore,
    O: OrderStore,
{
    /// Creates a new checkout coordinator.
    pub fn new(catalog: C, orders: O) -> Self {
        Self { catalog, orders }
    }

    /// Places an order for the request's cart.
    ///
    /// On success the order, its line items and every stock decrement are
    /// durable. On failure no order or line item from this attempt remains.
    #[tracing::instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<CheckoutReceipt> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.execute(request).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(receipt) => {
                metrics::counter!("checkout_completed_total").increment(1);
                tracing::info!(
                    order_id = %receipt.order.id,
                    total = %receipt.order.total_amount,
                    "checkout completed"
                );
            }
            Err(err) if err.is_rejection() => {
                metrics::counter!("checkout_rejected_total", "reason" => err.kind()).increment(1);
                tracing::info!(reason = err.kind(), error = %err, "checkout rejected");
            }
            Err(err) => {
                metrics::counter!("checkout_failed_total", "reason" => err.kind()).increment(1);
                tracing::warn!(reason = err.kind(), error = %err, "checkout failed");
            }
        }

        result
    }

    async fn execute(&self, request: CheckoutRequest) -> Result<CheckoutReceipt> {
        // 1. Identity
        let user_id = self.resolve_user(request.principal.as_ref()).await?;

        // 2. Request shape
        pricing::validate_input(&request.lines, request.delivery_slot_id.as_deref())?;

        // 3. Authoritative product data, read once
        let ids: Vec<ProductId> = request
            .lines
            .iter()
            .map(|line| line.product_id.clone())
            .collect();
        let snapshots = self.catalog.get_products(&ids).await?;

        // 4. Availability and pricing; nothing has been written yet
        let cart = pricing::price_cart(&request.lines, snapshots)?;

        let order = Order::pending(user_id, cart.total);
        let line_items = cart.line_items(order.id);
        let mut saga = CheckoutSaga::new(order.id);
        saga.start();

        // Phase 1: order header
        if let Err(err) = self.orders.insert_order(&order).await {
            self.compensate(&mut saga, &err.to_string()).await;
            return Err(CheckoutError::Transport(err));
        }
        saga.record(CheckoutStep::OrderCreated);

        // Phase 2: line items, one batch
        if let Err(err) = self.orders.insert_line_items(&line_items).await {
            let reason = err.to_string();
            self.compensate(&mut saga, &reason).await;
            return Err(CheckoutError::OrderPersistenceFailed {
                order_id: order.id,
                reason,
            });
        }
        saga.record(CheckoutStep::LineItemsCreated);

        // Phase 3: guarded decrements, strictly sequential in cart order
        for item in &line_items {
            let reason = match self
                .catalog
                .decrement_stock(&item.product_id, item.quantity)
                .await
            {
                Ok(StockDecrement::Applied { remaining }) => {
                    metrics::counter!("stock_decrements_total", "outcome" => "applied")
                        .increment(1);
                    tracing::debug!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        remaining,
                        "stock decremented"
                    );
                    saga.record(CheckoutStep::StockDecremented {
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                    });
                    continue;
                }
                Ok(StockDecrement::Insufficient) => {
                    metrics::counter!("stock_decrements_total", "outcome" => "insufficient")
                        .increment(1);
                    "insufficient stock at the time of update".to_string()
                }
                Err(err) => {
                    metrics::counter!("stock_decrements_total", "outcome" => "error").increment(1);
                    err.to_string()
                }
            };

            self.compensate(&mut saga, &reason).await;
            return Err(CheckoutError::StockUpdateFailed {
                product_id: item.product_id.clone(),
                reason,
            });
        }

        saga.complete();

        let units: u64 = line_items.iter().map(|item| u64::from(item.quantity)).sum();
        let message = format!(
            "Order {} placed: {} item(s), total {}. Status: {}.",
            order.id, units, order.total_amount, order.status
        );

        Ok(CheckoutReceipt {
            order,
            line_items,
            message,
        })
    }

    async fn resolve_user(&self, principal: Option<&PrincipalId>) -> Result<UserId> {
        let principal = principal.ok_or(CheckoutError::Unauthenticated)?;
        self.orders
            .find_user_id(principal)
            .await?
            .ok_or(CheckoutError::Unauthenticated)
    }

    /// Undoes this attempt's order writes, newest first.
    ///
    /// A failed delete is logged and counted; the remaining actions still run.
    /// Deleting the order also removes its line items, so a failed line-item
    /// delete is still cleaned up when the order delete succeeds.
    #[tracing::instrument(skip(self, saga), fields(order_id = %saga.order_id()))]
    async fn compensate(&self, saga: &mut CheckoutSaga, reason: &str) {
        let order_id = saga.order_id();
        let steps: Vec<&str> = saga.completed_steps().iter().map(CheckoutStep::name).collect();
        tracing::warn!(%order_id, reason, ?steps, "rolling back checkout");

        for action in saga.begin_compensation() {
            let result = match action {
                CompensationAction::DeleteLineItems => {
                    self.orders.delete_line_items(order_id).await
                }
                CompensationAction::DeleteOrder => self.orders.delete_order(order_id).await,
            };

            match result {
                Ok(()) => {
                    metrics::counter!("checkout_compensated_total", "step" => action.as_str())
                        .increment(1);
                }
                Err(err) => {
                    metrics::counter!("checkout_compensation_failures_total").increment(1);
                    tracing::error!(
                        %order_id,
                        step = action.as_str(),
                        error = %err,
                        "compensation step failed"
                    );
                }
            }
        }

        saga.finish_compensation();
    }
}
