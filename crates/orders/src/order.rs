//! The order aggregate.

use chrono::{DateTime, Utc};
use common::{OrderId, Sku};
use messaging::ReservationItem;
use serde::{Deserialize, Serialize};

use crate::error::{OrdersError, Result};
use crate::status::OrderStatus;

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product ordered.
    pub sku: Sku,
    /// Quantity ordered.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: f64,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(sku: impl Into<Sku>, quantity: u32, unit_price: f64) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity × unit price).
    pub fn total_price(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// One entry of the append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// The status the order moved to.
    pub status: OrderStatus,
    /// When the transition happened.
    pub date: DateTime<Utc>,
    /// Optional human-readable context.
    pub comment: Option<String>,
}

/// Input for creating a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    /// Line items; total price is computed from these.
    pub items: Vec<OrderItem>,
    /// Delivery address.
    pub address: String,
    /// Customer contact number.
    pub phone_number: String,
}

/// An order document.
///
/// The status field only ever changes through [`Order::apply_status`], which
/// consults the transition table and appends to the history, keeping the
/// invariant that the last history entry always matches the current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Opaque identity, assigned at creation.
    pub id: OrderId,
    /// Ordered line items.
    pub items: Vec<OrderItem>,
    /// Delivery address.
    pub address: String,
    /// Customer contact number.
    pub phone_number: String,
    /// Sum of quantity × unit price, fixed at creation.
    pub total_price: f64,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// Append-only transition log, seeded with one `created` entry.
    pub status_history: Vec<StatusEntry>,
    /// Document version for optimistic concurrency control.
    pub version: u64,
}

impl Order {
    /// Creates a new order in `created` status with a seeded history entry.
    pub fn new(request: CreateOrder) -> Self {
        let total_price = request.items.iter().map(OrderItem::total_price).sum();
        Self {
            id: OrderId::new(),
            items: request.items,
            address: request.address,
            phone_number: request.phone_number,
            total_price,
            status: OrderStatus::Created,
            status_history: vec![StatusEntry {
                status: OrderStatus::Created,
                date: Utc::now(),
                comment: None,
            }],
            version: 0,
        }
    }

    /// Applies a validated status transition.
    ///
    /// Appends a history entry (with a default comment when none is given)
    /// and sets the new status. Rejects transitions the table does not allow,
    /// leaving the order unmodified.
    pub fn apply_status(
        &mut self,
        next: OrderStatus,
        comment: Option<String>,
    ) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(OrdersError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let comment =
            comment.unwrap_or_else(|| format!("Status changed from {} to {}", self.status, next));
        self.status_history.push(StatusEntry {
            status: next,
            date: Utc::now(),
            comment: Some(comment),
        });
        self.status = next;
        Ok(())
    }

    /// Returns the items in the shape the inventory channel expects.
    pub fn reservation_items(&self) -> Vec<ReservationItem> {
        self.items
            .iter()
            .map(|item| ReservationItem::new(item.sku.clone(), item.quantity))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(CreateOrder {
            items: vec![
                OrderItem::new("SKU-001", 2, 9.5),
                OrderItem::new("SKU-002", 1, 5.0),
            ],
            address: "1 Main St".to_string(),
            phone_number: "+10000000000".to_string(),
        })
    }

    #[test]
    fn new_order_computes_total_price() {
        let order = sample_order();
        assert_eq!(order.total_price, 24.0);
    }

    #[test]
    fn new_order_seeds_history_with_created() {
        let order = sample_order();
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.status_history.len(), 1);
        assert_eq!(order.status_history[0].status, OrderStatus::Created);
    }

    #[test]
    fn apply_status_appends_history_and_updates_status() {
        let mut order = sample_order();
        order
            .apply_status(OrderStatus::Confirmed, Some("Inventory reserved".to_string()))
            .unwrap();

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.status_history.len(), 2);
        let last = order.status_history.last().unwrap();
        assert_eq!(last.status, OrderStatus::Confirmed);
        assert_eq!(last.comment.as_deref(), Some("Inventory reserved"));
    }

    #[test]
    fn apply_status_default_comment() {
        let mut order = sample_order();
        order.apply_status(OrderStatus::Cancelled, None).unwrap();

        let last = order.status_history.last().unwrap();
        assert_eq!(
            last.comment.as_deref(),
            Some("Status changed from created to cancelled")
        );
    }

    #[test]
    fn invalid_transition_leaves_order_unmodified() {
        let mut order = sample_order();
        let before = order.clone();

        let result = order.apply_status(OrderStatus::Paid, None);
        assert!(matches!(
            result,
            Err(OrdersError::InvalidTransition {
                from: OrderStatus::Created,
                to: OrderStatus::Paid,
            })
        ));
        assert_eq!(order, before);
    }

    #[test]
    fn history_last_entry_matches_status_through_lifecycle() {
        let mut order = sample_order();
        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Paid,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            order.apply_status(next, None).unwrap();
            assert_eq!(order.status_history.last().unwrap().status, order.status);
        }
        assert_eq!(order.status_history.len(), 6);
    }

    #[test]
    fn reservation_items_mirror_line_items() {
        let order = sample_order();
        let items = order.reservation_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].sku.as_str(), "SKU-001");
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn order_serialization_roundtrip() {
        let order = sample_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
