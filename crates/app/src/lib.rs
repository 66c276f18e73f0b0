//! Wiring for the order saga.
//!
//! Builds the in-memory broker, the four services, and one consumer task per
//! channel. The returned [`App`] exposes the service handles; the consumer
//! tasks are detached and live for the rest of the runtime.

pub mod config;

use billing::{BillingService, InMemoryPaymentStore, StaticGateway};
use inventory::{InMemoryProductStore, InMemoryReservationStore, InventoryService};
use messaging::InMemoryBus;
use orders::{InMemoryOrderStore, OrdersService, SagaHandler};
use shipping::{InMemoryShipmentStore, ShippingService};

pub use config::Config;

/// The wired system: one handle per service plus the broker itself.
#[derive(Debug, Clone)]
pub struct App {
    pub orders: OrdersService<InMemoryOrderStore, InMemoryBus>,
    pub inventory: InventoryService<InMemoryProductStore, InMemoryReservationStore>,
    pub billing: BillingService<InMemoryPaymentStore, StaticGateway, InMemoryBus>,
    pub shipping: ShippingService<InMemoryShipmentStore, InMemoryBus>,
    pub bus: InMemoryBus,
    pub gateway: StaticGateway,
}

impl App {
    /// Builds the system and spawns the consumer tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(config: &Config) -> Self {
        let (bus, consumers) = InMemoryBus::with_reply_timeout(config.reserve_reply_timeout());
        let gateway = StaticGateway::new(config.gateway_approve);

        let orders = OrdersService::new(InMemoryOrderStore::new(), bus.clone());
        let inventory = InventoryService::new(
            InMemoryProductStore::new(),
            InMemoryReservationStore::new(),
        );
        let billing = BillingService::new(
            InMemoryPaymentStore::new(),
            gateway.clone(),
            bus.clone(),
        );
        let shipping = ShippingService::new(InMemoryShipmentStore::new(), bus.clone());

        tokio::spawn(inventory.clone().run(consumers.reserve));
        tokio::spawn(billing.clone().run(consumers.billing));
        tokio::spawn(shipping.clone().run(consumers.shipping));
        tokio::spawn(SagaHandler::new(orders.clone()).run(consumers.orders));

        tracing::info!("saga services started");

        Self {
            orders,
            inventory,
            billing,
            shipping,
            bus,
            gateway,
        }
    }
}
