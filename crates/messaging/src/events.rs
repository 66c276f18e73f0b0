//! Message payloads for each service channel.

use common::{OrderId, Sku};
use serde::{Deserialize, Serialize};

/// One line of a reservation request: how many units of a SKU to hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationItem {
    /// The product to reserve.
    pub sku: Sku,
    /// Quantity to reserve.
    pub quantity: u32,
}

impl ReservationItem {
    /// Creates a new reservation item.
    pub fn new(sku: impl Into<Sku>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

/// Request/reply call sent to the inventory service when an order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveStockRequest {
    /// The order the reservation belongs to.
    pub order_id: OrderId,
    /// Items to reserve, processed sequentially.
    pub items: Vec<ReservationItem>,
}

/// The inventory service's definite verdict on a reservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveReply {
    /// True if every item was reserved, false on any failure.
    pub success: bool,
}

/// Fire-and-forget payment request consumed by the billing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// The order to charge for.
    pub order_id: OrderId,
    /// Amount to charge.
    pub total_price: f64,
    /// Customer contact for the payment provider.
    pub phone_number: String,
}

/// Fire-and-forget shipment trigger consumed by the shipping service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRequest {
    /// The paid order to ship.
    pub order_id: OrderId,
    /// Destination address.
    pub address: String,
}

/// Saga notifications consumed by the orders service.
///
/// Each variant carries the bare order identity; consumers that need more
/// (e.g. the shipping trigger needs an address) re-read it from the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum OrdersEvent {
    /// Billing charged the order successfully.
    PaymentSuccessful { order_id: OrderId },

    /// Billing could not charge the order.
    PaymentFailed { order_id: OrderId },

    /// Shipping started preparing the order.
    ShippingProcessing { order_id: OrderId },

    /// The order left the warehouse.
    OrderShipped { order_id: OrderId },

    /// The order reached the customer.
    OrderDelivered { order_id: OrderId },

    /// Shipping failed and was abandoned.
    ShippingFailed { order_id: OrderId },
}

impl OrdersEvent {
    /// Returns the event name used in logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            OrdersEvent::PaymentSuccessful { .. } => "payment_successful",
            OrdersEvent::PaymentFailed { .. } => "payment_failed",
            OrdersEvent::ShippingProcessing { .. } => "shipping_processing",
            OrdersEvent::OrderShipped { .. } => "order_shipped",
            OrdersEvent::OrderDelivered { .. } => "order_delivered",
            OrdersEvent::ShippingFailed { .. } => "shipping_failed",
        }
    }

    /// Returns the order this event refers to.
    pub fn order_id(&self) -> OrderId {
        match *self {
            OrdersEvent::PaymentSuccessful { order_id }
            | OrdersEvent::PaymentFailed { order_id }
            | OrdersEvent::ShippingProcessing { order_id }
            | OrdersEvent::OrderShipped { order_id }
            | OrdersEvent::OrderDelivered { order_id }
            | OrdersEvent::ShippingFailed { order_id } => order_id,
        }
    }
}
