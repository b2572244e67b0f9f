//! Persisted order header and line items.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderStatus};
use crate::catalog::{ProductId, ProductSnapshot};

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order with a freshly generated id.
    pub fn pending(user_id: UserId, total_amount: Money) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            total_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A single line of a persisted order.
///
/// `unit_price` is the catalog price at the moment the order was written and
/// is never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLineItem {
    /// Builds a line item priced from the given snapshot.
    pub fn priced_from(order_id: OrderId, snapshot: &ProductSnapshot, quantity: u32) -> Self {
        Self {
            order_id,
            product_id: snapshot.product_id.clone(),
            quantity,
            unit_price: snapshot.authoritative_price,
        }
    }
}
