//! Domain layer for the storefront checkout.
//!
//! This crate provides the records the checkout reads and writes:
//! - Catalog snapshots and product identifiers
//! - Client-submitted cart lines
//! - Order headers, order line items, and the order status lifecycle
//! - Integer-cent money arithmetic

pub mod cart;
pub mod catalog;
pub mod error;
pub mod order;

pub use cart::CartLine;
pub use catalog::{ProductId, ProductSnapshot};
pub use common::{OrderId, PrincipalId, UserId};
pub use error::DomainError;
pub use order::{Money, Order, OrderLineItem, OrderStatus};
