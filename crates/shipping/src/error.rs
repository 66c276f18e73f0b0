//! Shipping error taxonomy.

use common::OrderId;
use messaging::TransportError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by the shipping service.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// No shipment exists for the given order.
    #[error("no shipment for order {0}")]
    ShipmentNotFound(OrderId),

    /// No shipment carries the given tracking number.
    #[error("no shipment with tracking number {0}")]
    TrackingNotFound(String),

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The message bus rejected a publish.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convenience alias for shipping results.
pub type Result<T> = std::result::Result<T, ShippingError>;
