//! Orders error types.

use common::OrderId;
use messaging::TransportError;
use thiserror::Error;

use crate::status::OrderStatus;
use crate::store::StoreError;

/// Errors that can occur during orders operations.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// No order exists with the given ID.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The transition table rejected the requested status change.
    #[error("status transition from {from} to {to} is not allowed")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A concurrent writer updated the order first; retryable.
    #[error("version conflict updating order {0}")]
    VersionConflict(OrderId),

    /// The message bus failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Any other store failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for OrdersError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => OrdersError::NotFound(id),
            StoreError::VersionConflict(id) => OrdersError::VersionConflict(id),
            other => OrdersError::Store(other),
        }
    }
}

/// Convenience type alias for orders results.
pub type Result<T> = std::result::Result<T, OrdersError>;
