//! Shipping participant.
//!
//! Consumes shipment requests for paid orders and walks each one through
//! processing, shipment, and delivery, reporting every step back on the
//! orders channel. A shipment that cannot be completed is cancelled with a
//! shipping-failed event so the order can be compensated.

pub mod error;
pub mod service;
pub mod shipment;
pub mod store;

pub use error::ShippingError;
pub use service::ShippingService;
pub use shipment::{SHIPPING_LEAD_DAYS, Shipment};
pub use store::{InMemoryShipmentStore, ShipmentStore, StoreError};
