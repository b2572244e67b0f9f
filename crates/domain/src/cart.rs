//! Client-submitted cart lines.

use serde::{Deserialize, Serialize};

use crate::catalog::ProductId;

/// One line of a submitted cart.
///
/// Only the product identity and the requested quantity are taken from the
/// client. Price and availability always come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub requested_quantity: u32,
}

impl CartLine {
    pub fn new(product_id: impl Into<ProductId>, requested_quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            requested_quantity,
        }
    }
}
