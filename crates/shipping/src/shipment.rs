//! Shipment document.

use chrono::{DateTime, Duration, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days between shipping and the estimated delivery date.
pub const SHIPPING_LEAD_DAYS: i64 = 3;

/// A shipment for one order. One shipment per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Shipment identity.
    pub id: Uuid,
    /// The order being shipped.
    pub order_id: OrderId,
    /// Destination address.
    pub address: String,
    /// Carrier tracking number, assigned when the shipment goes out.
    pub tracking_number: Option<String>,
    /// Expected delivery, stamped alongside the tracking number.
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    /// When the shipment actually arrived.
    pub actual_delivery_date: Option<DateTime<Utc>>,
    /// When the shipment was created.
    pub created_at: DateTime<Utc>,
}

impl Shipment {
    /// Creates a shipment that has not gone out yet.
    pub fn new(order_id: OrderId, address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            address: address.into(),
            tracking_number: None,
            estimated_delivery_date: None,
            actual_delivery_date: None,
            created_at: Utc::now(),
        }
    }

    /// Marks the shipment as handed to the carrier.
    pub fn shipped(mut self) -> Self {
        self.tracking_number = Some(format!("TN-{}", Uuid::new_v4().simple()));
        self.estimated_delivery_date = Some(Utc::now() + Duration::days(SHIPPING_LEAD_DAYS));
        self
    }

    /// Marks the shipment as delivered.
    pub fn delivered(mut self) -> Self {
        self.actual_delivery_date = Some(Utc::now());
        self
    }

    /// True once the shipment has arrived.
    pub fn is_delivered(&self) -> bool {
        self.actual_delivery_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_assigns_tracking_and_estimate() {
        let shipment = Shipment::new(OrderId::new(), "1 Main St").shipped();

        let tracking = shipment.tracking_number.as_deref().unwrap();
        assert!(tracking.starts_with("TN-"));

        let estimate = shipment.estimated_delivery_date.unwrap();
        assert!(estimate > Utc::now() + Duration::days(SHIPPING_LEAD_DAYS - 1));
        assert!(!shipment.is_delivered());
    }

    #[test]
    fn delivered_stamps_arrival() {
        let shipment = Shipment::new(OrderId::new(), "1 Main St").shipped().delivered();
        assert!(shipment.is_delivered());
    }
}
