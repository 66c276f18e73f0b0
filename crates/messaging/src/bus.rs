//! The outbound message bus contract.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::events::{
    OrdersEvent, PaymentRequest, ReserveReply, ReserveStockRequest, ShipmentRequest,
};

/// Outbound side of the broker, one method per channel.
///
/// A bus handle is constructed explicitly and passed into each service at
/// construction time; there is no ambient broker state. Fire-and-forget
/// methods resolve once the broker accepted the message; delivery to the
/// consumer is best-effort from the publisher's point of view.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Request/reply reservation call. Suspends until the inventory service
    /// answers or the reply deadline elapses; a transport failure here is
    /// always a reservation failure for the caller.
    async fn reserve_stock(
        &self,
        request: ReserveStockRequest,
    ) -> Result<ReserveReply, TransportError>;

    /// Publishes a saga notification to the orders service.
    async fn notify_orders(&self, event: OrdersEvent) -> Result<(), TransportError>;

    /// Publishes a payment request to the billing service.
    async fn request_payment(&self, request: PaymentRequest) -> Result<(), TransportError>;

    /// Publishes a shipment trigger to the shipping service.
    async fn request_shipment(&self, request: ShipmentRequest) -> Result<(), TransportError>;
}
