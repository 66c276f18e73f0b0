//! Test doubles shared by the unit tests in this crate.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use messaging::{
    MessageBus, OrdersEvent, PaymentRequest, ReserveReply, ReserveStockRequest, ShipmentRequest,
    TransportError,
};

use crate::order::{CreateOrder, OrderItem};

/// Scripted bus double: configurable reservation verdict, recorded emits.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubBus {
    pub reserve_outcome: Arc<Mutex<Option<Result<bool, ()>>>>,
    pub payment_requests: Arc<Mutex<Vec<PaymentRequest>>>,
    pub shipment_requests: Arc<Mutex<Vec<ShipmentRequest>>>,
    pub orders_events: Arc<Mutex<Vec<OrdersEvent>>>,
    pub fail_on_shipment: Arc<Mutex<bool>>,
}

impl StubBus {
    /// A bus whose inventory leg replies with the given verdict.
    pub fn replying(success: bool) -> Self {
        let bus = Self::default();
        *bus.reserve_outcome.lock().unwrap() = Some(Ok(success));
        bus
    }

    /// A bus whose inventory leg fails at the transport level.
    pub fn failing_transport() -> Self {
        let bus = Self::default();
        *bus.reserve_outcome.lock().unwrap() = Some(Err(()));
        bus
    }
}

#[async_trait]
impl MessageBus for StubBus {
    async fn reserve_stock(
        &self,
        _request: ReserveStockRequest,
    ) -> Result<ReserveReply, TransportError> {
        let outcome = *self.reserve_outcome.lock().unwrap();
        match outcome.unwrap_or(Ok(true)) {
            Ok(success) => Ok(ReserveReply { success }),
            Err(()) => Err(TransportError::PublishFailed("inventory")),
        }
    }

    async fn notify_orders(&self, event: OrdersEvent) -> Result<(), TransportError> {
        self.orders_events.lock().unwrap().push(event);
        Ok(())
    }

    async fn request_payment(&self, request: PaymentRequest) -> Result<(), TransportError> {
        self.payment_requests.lock().unwrap().push(request);
        Ok(())
    }

    async fn request_shipment(&self, request: ShipmentRequest) -> Result<(), TransportError> {
        if *self.fail_on_shipment.lock().unwrap() {
            return Err(TransportError::PublishFailed("shipping"));
        }
        self.shipment_requests.lock().unwrap().push(request);
        Ok(())
    }
}

/// One-line order request used across tests.
pub(crate) fn sample_request() -> CreateOrder {
    CreateOrder {
        items: vec![OrderItem::new("x", 1, 100.0)],
        address: "A".to_string(),
        phone_number: "+1".to_string(),
    }
}
