//! Shipping service: shipment lifecycle and progress events.

use common::OrderId;
use messaging::events::{OrdersEvent, ShipmentRequest};
use messaging::{Delivery, EventConsumer, MessageBus};

use crate::error::{Result, ShippingError};
use crate::shipment::Shipment;
use crate::store::ShipmentStore;

/// Walks paid orders through processing, shipment, and delivery.
///
/// Progress notifications (processing, shipped) are best-effort: losing one
/// leaves the order's status behind while the shipment itself completes. The
/// delivered event propagates its emit failure instead, so a shipment whose
/// outcome cannot be reported is cancelled rather than silently completed.
#[derive(Debug, Clone)]
pub struct ShippingService<S, B> {
    shipments: S,
    bus: B,
}

impl<S, B> ShippingService<S, B>
where
    S: ShipmentStore,
    B: MessageBus,
{
    /// Creates a service over the given store and bus.
    pub fn new(shipments: S, bus: B) -> Self {
        Self { shipments, bus }
    }

    /// Consumes shipment requests until the channel closes.
    pub async fn run(self, mut consumer: EventConsumer<ShipmentRequest>) {
        while let Some(delivery) = consumer.recv().await {
            self.handle(delivery).await;
        }
    }

    /// Processes one shipment request and settles the delivery.
    ///
    /// Failures are compensated, not redelivered: a shipment that cannot be
    /// completed is cancelled with a shipping-failed event, and the request
    /// is acknowledged either way.
    #[tracing::instrument(skip(self, delivery), fields(order_id = %delivery.event().order_id))]
    pub async fn handle(&self, delivery: Delivery<ShipmentRequest>) {
        let request = delivery.event().clone();

        match self.ship(&request).await {
            Ok(shipment) => {
                metrics::counter!("shipping_shipments_total", "result" => "delivered")
                    .increment(1);
                tracing::info!(
                    order_id = %shipment.order_id,
                    tracking = shipment.tracking_number.as_deref().unwrap_or(""),
                    "shipment delivered"
                );
            }
            Err(e) => {
                metrics::counter!("shipping_shipments_total", "result" => "failed").increment(1);
                tracing::warn!(order_id = %request.order_id, error = %e, "shipment failed, cancelling");
                self.cancel_shipping(request.order_id).await;
            }
        }

        delivery.ack();
    }

    /// Runs a shipment end to end: processing, carrier handoff, delivery.
    async fn ship(&self, request: &ShipmentRequest) -> Result<Shipment> {
        if let Some(existing) = self.shipments.find_by_order(request.order_id).await? {
            if existing.is_delivered() {
                // Replayed request; re-emit the terminal event and stop.
                self.bus
                    .notify_orders(OrdersEvent::OrderDelivered {
                        order_id: request.order_id,
                    })
                    .await?;
                return Ok(existing);
            }
        }

        self.notify_best_effort(OrdersEvent::ShippingProcessing {
            order_id: request.order_id,
        })
        .await;

        let shipment = self
            .shipments
            .upsert(Shipment::new(request.order_id, request.address.clone()).shipped())
            .await?;

        self.notify_best_effort(OrdersEvent::OrderShipped {
            order_id: request.order_id,
        })
        .await;

        let tracking = shipment
            .tracking_number
            .clone()
            .unwrap_or_default();
        self.deliver(&tracking).await
    }

    /// Marks a shipment as delivered by tracking number.
    ///
    /// The delivered event must reach the orders channel; an emit failure
    /// propagates so the caller can compensate.
    #[tracing::instrument(skip(self))]
    pub async fn deliver(&self, tracking: &str) -> Result<Shipment> {
        let shipment = self
            .shipments
            .find_by_tracking(tracking)
            .await?
            .ok_or_else(|| ShippingError::TrackingNotFound(tracking.to_string()))?;

        let delivered = self.shipments.upsert(shipment.delivered()).await?;

        self.bus
            .notify_orders(OrdersEvent::OrderDelivered {
                order_id: delivered.order_id,
            })
            .await?;
        Ok(delivered)
    }

    /// Compensates a failed shipment.
    async fn cancel_shipping(&self, order_id: OrderId) {
        self.notify_best_effort(OrdersEvent::ShippingFailed { order_id })
            .await;
    }

    /// Returns the shipment for an order.
    pub async fn get_shipment(&self, order_id: OrderId) -> Result<Shipment> {
        self.shipments
            .find_by_order(order_id)
            .await?
            .ok_or(ShippingError::ShipmentNotFound(order_id))
    }

    /// Returns all shipments.
    pub async fn list_shipments(&self) -> Result<Vec<Shipment>> {
        Ok(self.shipments.find_all().await?)
    }

    async fn notify_best_effort(&self, event: OrdersEvent) {
        if let Err(e) = self.bus.notify_orders(event).await {
            tracing::warn!(
                order_id = %event.order_id(),
                event = event.name(),
                error = %e,
                "failed to publish shipping event"
            );
        }
    }
}
