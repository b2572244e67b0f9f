//! Order records and related types.

mod record;
mod state;
mod value_objects;

pub use record::{Order, OrderLineItem};
pub use state::OrderStatus;
pub use value_objects::Money;
