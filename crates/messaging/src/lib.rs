//! Message bus contract for the order saga services.
//!
//! Each service channel carries a closed set of message types, so routing
//! mistakes are compile errors rather than misspelled topic strings:
//! - inventory: [`ReserveStockRequest`] → [`ReserveReply`] (request/reply)
//! - billing: [`PaymentRequest`] (fire-and-forget)
//! - shipping: [`ShipmentRequest`] (fire-and-forget)
//! - orders: [`OrdersEvent`] (fire-and-forget saga notifications)
//!
//! Fire-and-forget consumers receive a [`Delivery`] handle and must settle it
//! with exactly one `ack` or `nack`; a nacked or dropped delivery is requeued,
//! giving at-least-once processing. For the request/reply channel the reply
//! itself acknowledges the request.

pub mod bus;
pub mod delivery;
pub mod error;
pub mod events;
pub mod memory;

pub use bus::MessageBus;
pub use delivery::{Delivery, EventConsumer};
pub use error::TransportError;
pub use events::{
    OrdersEvent, PaymentRequest, ReservationItem, ReserveReply, ReserveStockRequest,
    ShipmentRequest,
};
pub use memory::{BusConsumers, InMemoryBus, ReserveCall};
