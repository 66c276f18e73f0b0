//! Orders service: the saga's driving side.
//!
//! An order moves created → confirmed → paid → processing → shipped →
//! delivered, with cancelled reachable from every non-terminal status. Every
//! mutation goes through the transition table, so duplicate or out-of-order
//! saga events degrade to rejected transitions instead of corrupting state.

pub mod error;
pub mod order;
pub mod saga;
pub mod service;
pub mod status;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::OrdersError;
pub use order::{CreateOrder, Order, OrderItem, StatusEntry};
pub use saga::SagaHandler;
pub use service::OrdersService;
pub use status::OrderStatus;
pub use store::{InMemoryOrderStore, OrderStore, StoreError};
