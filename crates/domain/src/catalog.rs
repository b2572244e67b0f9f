//! Catalog-side types read at checkout time.

use serde::{Deserialize, Serialize};

use crate::order::Money;

/// Product identifier (SKU).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Point-in-time read of a catalog product.
///
/// Used for validation and pricing; never re-read during the same checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub authoritative_price: Money,
    pub available_stock: u32,
    pub display_name: String,
}

impl ProductSnapshot {
    pub fn new(
        product_id: impl Into<ProductId>,
        display_name: impl Into<String>,
        authoritative_price: Money,
        available_stock: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            authoritative_price,
            available_stock,
            display_name: display_name.into(),
        }
    }

    /// Returns true if `quantity` units can be taken from this snapshot.
    pub fn can_supply(&self, quantity: u32) -> bool {
        quantity <= self.available_stock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_string_conversion() {
        let id = ProductId::new("SKU-001");
        assert_eq!(id.as_str(), "SKU-001");

        let id2: ProductId = "SKU-002".into();
        assert_eq!(id2.as_str(), "SKU-002");
    }

    #[test]
    fn test_can_supply_is_inclusive() {
        let snapshot = ProductSnapshot::new("P1", "Widget", Money::from_cents(1000), 5);
        assert!(snapshot.can_supply(5));
        assert!(!snapshot.can_supply(6));
    }
}
