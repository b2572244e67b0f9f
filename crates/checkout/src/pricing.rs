//! Cart validation and authoritative pricing.

use std::collections::HashMap;

use common::OrderId;
use domain::{CartLine, Money, OrderLineItem, ProductId, ProductSnapshot};

use crate::error::{CheckoutError, Result};

/// A cart line reconciled against its catalog snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub snapshot: ProductSnapshot,
    pub quantity: u32,
}

/// A fully validated cart with its authoritative total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}

impl PricedCart {
    /// Builds one line item per priced line, in cart order.
    pub fn line_items(&self, order_id: OrderId) -> Vec<OrderLineItem> {
        self.lines
            .iter()
            .map(|line| OrderLineItem::priced_from(order_id, &line.snapshot, line.quantity))
            .collect()
    }
}

/// Checks the request shape before anything is read from the catalog.
pub fn validate_input(lines: &[CartLine], delivery_slot_id: Option<&str>) -> Result<()> {
    if lines.is_empty() {
        return Err(CheckoutError::InvalidInput("cart is empty".to_string()));
    }

    if delivery_slot_id.is_none_or(|slot| slot.trim().is_empty()) {
        return Err(CheckoutError::InvalidInput(
            "a delivery slot must be selected".to_string(),
        ));
    }

    if let Some(line) = lines.iter().find(|line| line.requested_quantity == 0) {
        return Err(CheckoutError::InvalidInput(format!(
            "quantity for product {} must be at least 1",
            line.product_id
        )));
    }

    Ok(())
}

/// Reconciles cart lines against catalog snapshots.
///
/// Every product is resolved before any availability check, so an unknown
/// product is reported even when an earlier line is short on stock. Lines
/// naming the same product are checked against their combined quantity.
/// Client-side prices never enter this computation.
pub fn price_cart(lines: &[CartLine], snapshots: Vec<ProductSnapshot>) -> Result<PricedCart> {
    let catalog: HashMap<ProductId, ProductSnapshot> = snapshots
        .into_iter()
        .map(|s| (s.product_id.clone(), s))
        .collect();

    let resolved = lines
        .iter()
        .map(|line| {
            catalog
                .get(&line.product_id)
                .map(|snapshot| (line, snapshot))
                .ok_or_else(|| CheckoutError::ProductUnavailable {
                    product_id: line.product_id.clone(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut requested: HashMap<&ProductId, u32> = HashMap::new();
    let mut total = Money::zero();
    let mut priced = Vec::with_capacity(resolved.len());

    for (line, snapshot) in resolved {
        let cumulative = requested.entry(&line.product_id).or_insert(0);
        *cumulative = cumulative.saturating_add(line.requested_quantity);

        if !snapshot.can_supply(*cumulative) {
            return Err(CheckoutError::InsufficientStock {
                product_id: snapshot.product_id.clone(),
                product_name: snapshot.display_name.clone(),
                available: snapshot.available_stock,
                requested: *cumulative,
            });
        }

        let line_total = snapshot
            .authoritative_price
            .checked_multiply(line.requested_quantity)?;
        total = total.checked_add(line_total)?;

        priced.push(PricedLine {
            snapshot: snapshot.clone(),
            quantity: line.requested_quantity,
        });
    }

    Ok(PricedCart {
        lines: priced,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::DomainError;

    fn catalog() -> Vec<ProductSnapshot> {
        vec![
            ProductSnapshot::new("P1", "Widget", Money::from_cents(1000), 5),
            ProductSnapshot::new("P2", "Gadget", Money::from_cents(2550), 1),
        ]
    }

    #[test]
    fn test_empty_cart_is_invalid() {
        let result = validate_input(&[], Some("slot-1"));
        assert!(matches!(result, Err(CheckoutError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_or_blank_delivery_slot_is_invalid() {
        let lines = vec![CartLine::new("P1", 1)];
        assert!(matches!(
            validate_input(&lines, None),
            Err(CheckoutError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_input(&lines, Some("  ")),
            Err(CheckoutError::InvalidInput(_))
        ));
        assert!(validate_input(&lines, Some("slot-1")).is_ok());
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        let lines = vec![CartLine::new("P1", 1), CartLine::new("P2", 0)];
        let err = validate_input(&lines, Some("slot-1")).unwrap_err();
        assert!(err.to_string().contains("P2"));
    }

    #[test]
    fn test_total_uses_catalog_prices() {
        let lines = vec![CartLine::new("P1", 2), CartLine::new("P2", 1)];
        let cart = price_cart(&lines, catalog()).unwrap();

        assert_eq!(cart.total, Money::from_cents(2 * 1000 + 2550));
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.lines[0].snapshot.product_id.as_str(), "P1");
        assert_eq!(cart.lines[1].quantity, 1);
    }

    #[test]
    fn test_unknown_product_wins_over_stock_shortage() {
        let lines = vec![CartLine::new("P1", 99), CartLine::new("GHOST", 1)];
        match price_cart(&lines, catalog()) {
            Err(CheckoutError::ProductUnavailable { product_id }) => {
                assert_eq!(product_id.as_str(), "GHOST")
            }
            other => panic!("expected ProductUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_insufficient_stock_reports_quantities() {
        let lines = vec![CartLine::new("P1", 10)];
        match price_cart(&lines, catalog()) {
            Err(CheckoutError::InsufficientStock {
                product_id,
                available,
                requested,
                ..
            }) => {
                assert_eq!(product_id.as_str(), "P1");
                assert_eq!(available, 5);
                assert_eq!(requested, 10);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_product_lines_are_checked_together() {
        let lines = vec![CartLine::new("P1", 3), CartLine::new("P1", 3)];
        assert!(matches!(
            price_cart(&lines, catalog()),
            Err(CheckoutError::InsufficientStock { requested: 6, .. })
        ));

        let lines = vec![CartLine::new("P1", 3), CartLine::new("P1", 2)];
        let cart = price_cart(&lines, catalog()).unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.total, Money::from_cents(5000));
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let snapshots = vec![
            ProductSnapshot::new("P1", "Widget", Money::from_cents(i64::MAX), 10),
            ProductSnapshot::new("P2", "Gadget", Money::from_cents(i64::MAX / 2 + 1), 10),
        ];

        let lines = vec![CartLine::new("P1", 2)];
        assert!(matches!(
            price_cart(&lines, snapshots.clone()),
            Err(CheckoutError::AmountOutOfRange(DomainError::AmountOverflow("line total")))
        ));

        let lines = vec![CartLine::new("P2", 1), CartLine::new("P2", 1)];
        assert!(matches!(
            price_cart(&lines, snapshots),
            Err(CheckoutError::AmountOutOfRange(DomainError::AmountOverflow("order total")))
        ));
    }

    #[test]
    fn test_line_items_copy_unit_price() {
        let lines = vec![CartLine::new("P2", 1)];
        let cart = price_cart(&lines, catalog()).unwrap();
        let order_id = OrderId::new();

        let items = cart.line_items(order_id);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, order_id);
        assert_eq!(items[0].unit_price, Money::from_cents(2550));
    }
}
