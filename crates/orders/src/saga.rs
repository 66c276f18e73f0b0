//! Saga reactions: orders-side handling of participant events.

use messaging::{Delivery, EventConsumer, MessageBus, OrdersEvent, ShipmentRequest};

use crate::error::{OrdersError, Result};
use crate::service::OrdersService;
use crate::status::OrderStatus;
use crate::store::OrderStore;

/// Applies inbound saga events to order state.
///
/// Each event maps to exactly one status transition. A rejected transition is
/// a duplicate or out-of-order delivery and is acknowledged as a no-op rather
/// than redelivered, so a replayed terminal event can never poison the queue.
/// Only transient failures (store conflicts after retries, transport errors)
/// are nacked for broker-level redelivery. One exception: a redelivered
/// payment-successful event for an order sitting at `paid` re-emits the
/// shipment trigger, because that is exactly the state a nacked emit failure
/// leaves behind.
#[derive(Debug, Clone)]
pub struct SagaHandler<S, B> {
    service: OrdersService<S, B>,
}

impl<S, B> SagaHandler<S, B>
where
    S: OrderStore,
    B: MessageBus,
{
    /// Creates a handler over the orders service.
    pub fn new(service: OrdersService<S, B>) -> Self {
        Self { service }
    }

    /// Consumes deliveries until the channel closes.
    pub async fn run(self, mut consumer: EventConsumer<OrdersEvent>) {
        while let Some(delivery) = consumer.recv().await {
            self.handle(delivery).await;
        }
    }

    /// Handles one delivery, settling it with exactly one ack or nack.
    #[tracing::instrument(skip(self, delivery), fields(event = delivery.event().name()))]
    pub async fn handle(&self, delivery: Delivery<OrdersEvent>) {
        let event = *delivery.event();
        metrics::counter!("saga_events_received_total", "event" => event.name()).increment(1);

        match self.apply(event).await {
            Ok(()) => delivery.ack(),
            Err(OrdersError::InvalidTransition { from, to }) => {
                // Duplicate or out-of-order delivery; the stored status has
                // already advanced. Acknowledge as a no-op.
                tracing::info!(
                    order_id = %event.order_id(),
                    %from,
                    %to,
                    "transition already applied, ignoring replayed event"
                );
                metrics::counter!("saga_events_ignored_total", "event" => event.name())
                    .increment(1);
                delivery.ack();
            }
            Err(OrdersError::NotFound(order_id)) => {
                // Redelivery cannot conjure up a missing order.
                tracing::warn!(%order_id, event = event.name(), "event for unknown order, dropping");
                delivery.ack();
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %event.order_id(),
                    event = event.name(),
                    error = %e,
                    "transient failure, requeueing event"
                );
                delivery.nack();
            }
        }
    }

    async fn apply(&self, event: OrdersEvent) -> Result<()> {
        match event {
            OrdersEvent::PaymentSuccessful { order_id } => {
                let order = match self
                    .service
                    .update_order_status(order_id, OrderStatus::Paid, None)
                    .await
                {
                    Ok(order) => order,
                    // Redelivery with the order already paid: the previous
                    // attempt may have nacked after persisting the transition
                    // but before the shipment emit below succeeded. Re-emit;
                    // shipping treats a repeated request as a replay.
                    Err(OrdersError::InvalidTransition {
                        from: OrderStatus::Paid,
                        to: OrderStatus::Paid,
                    }) => self.service.get_order(order_id).await?,
                    Err(e) => return Err(e),
                };

                // This emit propagates on failure: without the shipment
                // trigger the saga stalls, so the broker must redeliver.
                self.service
                    .bus()
                    .request_shipment(ShipmentRequest {
                        order_id,
                        address: order.address,
                    })
                    .await?;
                Ok(())
            }
            OrdersEvent::PaymentFailed { order_id } => {
                self.service
                    .update_order_status(
                        order_id,
                        OrderStatus::Cancelled,
                        Some("Payment failed".to_string()),
                    )
                    .await?;
                Ok(())
            }
            OrdersEvent::ShippingProcessing { order_id } => {
                self.service
                    .update_order_status(order_id, OrderStatus::Processing, None)
                    .await?;
                Ok(())
            }
            OrdersEvent::OrderShipped { order_id } => {
                self.service
                    .update_order_status(order_id, OrderStatus::Shipped, None)
                    .await?;
                Ok(())
            }
            OrdersEvent::OrderDelivered { order_id } => {
                self.service
                    .update_order_status(order_id, OrderStatus::Delivered, None)
                    .await?;
                Ok(())
            }
            OrdersEvent::ShippingFailed { order_id } => {
                self.service
                    .update_order_status(
                        order_id,
                        OrderStatus::Cancelled,
                        Some("Shipping failed".to_string()),
                    )
                    .await?;
                Ok(())
            }
        }
    }
}
