//! Order placement (checkout) for the storefront.
//!
//! A checkout turns a client-submitted cart into a durable order in three
//! write phases:
//! 1. Insert the order header
//! 2. Batch-insert the order line items
//! 3. Decrement stock once per line item with a guarded update
//!
//! All validation happens before the first write. If a write phase fails,
//! the order header and line items written so far are deleted in reverse
//! order. Stock decrements that already succeeded are kept.

pub mod coordinator;
pub mod error;
pub mod pricing;
pub mod saga;

pub use coordinator::{CheckoutCoordinator, CheckoutReceipt, CheckoutRequest};
pub use error::CheckoutError;
pub use pricing::{PricedCart, PricedLine};
pub use saga::{CheckoutSaga, CheckoutStep, CompensationAction};
