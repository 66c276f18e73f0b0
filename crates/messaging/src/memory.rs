//! In-memory broker implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::bus::MessageBus;
use crate::delivery::EventConsumer;
use crate::error::TransportError;
use crate::events::{
    OrdersEvent, PaymentRequest, ReserveReply, ReserveStockRequest, ShipmentRequest,
};

/// Default deadline for the inventory request/reply round-trip.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// An inbound reservation request plus its reply handle.
///
/// For request/reply messages the reply is the acknowledgment: answering
/// settles the message. Dropping the call without replying surfaces as a
/// [`TransportError::ReplyDropped`] on the requesting side, which treats it
/// as a reservation failure.
#[derive(Debug)]
pub struct ReserveCall {
    request: ReserveStockRequest,
    reply: Option<oneshot::Sender<ReserveReply>>,
}

impl ReserveCall {
    fn new(request: ReserveStockRequest, reply: oneshot::Sender<ReserveReply>) -> Self {
        Self {
            request,
            reply: Some(reply),
        }
    }

    /// Returns the reservation request.
    pub fn request(&self) -> &ReserveStockRequest {
        &self.request
    }

    /// Sends the verdict back to the requester.
    pub fn reply(mut self, reply: ReserveReply) {
        if let Some(tx) = self.reply.take() {
            // Failure means the requester timed out and went away.
            let _ = tx.send(reply);
        }
    }
}

impl Drop for ReserveCall {
    fn drop(&mut self) {
        if self.reply.is_some() {
            tracing::warn!(order_id = %self.request.order_id, "reserve call dropped without reply");
        }
    }
}

#[derive(Debug)]
struct BusInner {
    reserve_tx: mpsc::UnboundedSender<ReserveCall>,
    orders_tx: mpsc::UnboundedSender<(OrdersEvent, u32)>,
    billing_tx: mpsc::UnboundedSender<(PaymentRequest, u32)>,
    shipping_tx: mpsc::UnboundedSender<(ShipmentRequest, u32)>,
    reply_timeout: Duration,
    fail_on_reserve: AtomicBool,
    fail_on_orders: AtomicBool,
    fail_on_billing: AtomicBool,
    fail_on_shipping: AtomicBool,
}

/// In-memory message bus backed by per-channel queues.
///
/// Cloning yields another handle to the same broker. The matching
/// [`BusConsumers`] side is handed to the service run loops.
#[derive(Debug, Clone)]
pub struct InMemoryBus {
    inner: Arc<BusInner>,
}

/// Consuming ends of every channel, one per service.
#[derive(Debug)]
pub struct BusConsumers {
    /// Inventory: request/reply reservation calls.
    pub reserve: mpsc::UnboundedReceiver<ReserveCall>,
    /// Orders: saga notifications.
    pub orders: EventConsumer<OrdersEvent>,
    /// Billing: payment requests.
    pub billing: EventConsumer<PaymentRequest>,
    /// Shipping: shipment triggers.
    pub shipping: EventConsumer<ShipmentRequest>,
}

impl InMemoryBus {
    /// Creates a broker with the default reply timeout.
    pub fn new() -> (Self, BusConsumers) {
        Self::with_reply_timeout(DEFAULT_REPLY_TIMEOUT)
    }

    /// Creates a broker with an explicit request/reply deadline.
    pub fn with_reply_timeout(reply_timeout: Duration) -> (Self, BusConsumers) {
        let (reserve_tx, reserve_rx) = mpsc::unbounded_channel();
        let (orders_tx, orders) = EventConsumer::channel();
        let (billing_tx, billing) = EventConsumer::channel();
        let (shipping_tx, shipping) = EventConsumer::channel();

        let bus = Self {
            inner: Arc::new(BusInner {
                reserve_tx,
                orders_tx,
                billing_tx,
                shipping_tx,
                reply_timeout,
                fail_on_reserve: AtomicBool::new(false),
                fail_on_orders: AtomicBool::new(false),
                fail_on_billing: AtomicBool::new(false),
                fail_on_shipping: AtomicBool::new(false),
            }),
        };

        let consumers = BusConsumers {
            reserve: reserve_rx,
            orders,
            billing,
            shipping,
        };

        (bus, consumers)
    }

    /// Makes subsequent reservation calls fail with a transport error.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.inner.fail_on_reserve.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent orders-channel publishes fail.
    pub fn set_fail_on_orders(&self, fail: bool) {
        self.inner.fail_on_orders.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent billing-channel publishes fail.
    pub fn set_fail_on_billing(&self, fail: bool) {
        self.inner.fail_on_billing.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent shipping-channel publishes fail.
    pub fn set_fail_on_shipping(&self, fail: bool) {
        self.inner.fail_on_shipping.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn reserve_stock(
        &self,
        request: ReserveStockRequest,
    ) -> Result<ReserveReply, TransportError> {
        if self.inner.fail_on_reserve.load(Ordering::SeqCst) {
            return Err(TransportError::PublishFailed("inventory"));
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.inner
            .reserve_tx
            .send(ReserveCall::new(request, reply_tx))
            .map_err(|_| TransportError::PublishFailed("inventory"))?;

        match timeout(self.inner.reply_timeout, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(TransportError::ReplyDropped("inventory")),
            Err(_) => Err(TransportError::ReplyTimeout {
                channel: "inventory",
                timeout_ms: self.inner.reply_timeout.as_millis() as u64,
            }),
        }
    }

    async fn notify_orders(&self, event: OrdersEvent) -> Result<(), TransportError> {
        if self.inner.fail_on_orders.load(Ordering::SeqCst) {
            return Err(TransportError::PublishFailed("orders"));
        }
        self.inner
            .orders_tx
            .send((event, 1))
            .map_err(|_| TransportError::PublishFailed("orders"))
    }

    async fn request_payment(&self, request: PaymentRequest) -> Result<(), TransportError> {
        if self.inner.fail_on_billing.load(Ordering::SeqCst) {
            return Err(TransportError::PublishFailed("billing"));
        }
        self.inner
            .billing_tx
            .send((request, 1))
            .map_err(|_| TransportError::PublishFailed("billing"))
    }

    async fn request_shipment(&self, request: ShipmentRequest) -> Result<(), TransportError> {
        if self.inner.fail_on_shipping.load(Ordering::SeqCst) {
            return Err(TransportError::PublishFailed("shipping"));
        }
        self.inner
            .shipping_tx
            .send((request, 1))
            .map_err(|_| TransportError::PublishFailed("shipping"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;
    use crate::events::ReservationItem;

    fn reserve_request() -> ReserveStockRequest {
        ReserveStockRequest {
            order_id: OrderId::new(),
            items: vec![ReservationItem::new("SKU-001", 2)],
        }
    }

    #[tokio::test]
    async fn reserve_round_trip() {
        let (bus, mut consumers) = InMemoryBus::new();

        let responder = tokio::spawn(async move {
            let call = consumers.reserve.recv().await.unwrap();
            assert_eq!(call.request().items.len(), 1);
            call.reply(ReserveReply { success: true });
        });

        let reply = bus.reserve_stock(reserve_request()).await.unwrap();
        assert!(reply.success);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn reserve_times_out_without_responder() {
        let (bus, _consumers) = InMemoryBus::with_reply_timeout(Duration::from_millis(20));

        let result = bus.reserve_stock(reserve_request()).await;
        assert!(matches!(
            result,
            Err(TransportError::ReplyTimeout { channel: "inventory", .. })
        ));
    }

    #[tokio::test]
    async fn dropped_call_is_a_reply_dropped_error() {
        let (bus, mut consumers) = InMemoryBus::new();

        let responder = tokio::spawn(async move {
            let call = consumers.reserve.recv().await.unwrap();
            drop(call);
        });

        let result = bus.reserve_stock(reserve_request()).await;
        assert!(matches!(result, Err(TransportError::ReplyDropped(_))));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn notify_orders_delivers_to_consumer() {
        let (bus, mut consumers) = InMemoryBus::new();
        let order_id = OrderId::new();

        bus.notify_orders(OrdersEvent::OrderShipped { order_id })
            .await
            .unwrap();

        let delivery = consumers.orders.recv().await.unwrap();
        assert_eq!(*delivery.event(), OrdersEvent::OrderShipped { order_id });
        delivery.ack();
    }

    #[tokio::test]
    async fn fail_toggles_surface_as_transport_errors() {
        let (bus, _consumers) = InMemoryBus::new();

        bus.set_fail_on_reserve(true);
        assert!(bus.reserve_stock(reserve_request()).await.is_err());

        bus.set_fail_on_orders(true);
        assert!(
            bus.notify_orders(OrdersEvent::PaymentFailed {
                order_id: OrderId::new()
            })
            .await
            .is_err()
        );

        bus.set_fail_on_billing(true);
        assert!(
            bus.request_payment(PaymentRequest {
                order_id: OrderId::new(),
                total_price: 10.0,
                phone_number: "+1".to_string(),
            })
            .await
            .is_err()
        );

        bus.set_fail_on_shipping(true);
        assert!(
            bus.request_shipment(ShipmentRequest {
                order_id: OrderId::new(),
                address: "A".to_string(),
            })
            .await
            .is_err()
        );
    }
}
