//! Inventory participant.
//!
//! Owns products and stock reservations. Answers the orders service's
//! request/reply reservation calls: all items reserved, or none (previously
//! applied items are explicitly released when a later item fails).

pub mod error;
pub mod product;
pub mod service;
pub mod store;

pub use error::InventoryError;
pub use product::{Product, Reservation, ReservationId};
pub use service::{AddProduct, InventoryService};
pub use store::{
    InMemoryProductStore, InMemoryReservationStore, ProductStore, ReservationStore, StoreError,
};
