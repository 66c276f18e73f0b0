//! Billing error taxonomy.

use common::OrderId;
use messaging::TransportError;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::payment::PaymentStatus;
use crate::store::StoreError;

/// Errors raised by the billing service.
#[derive(Debug, Error)]
pub enum BillingError {
    /// No payment exists for the given order.
    #[error("no payment for order {0}")]
    PaymentNotFound(OrderId),

    /// Only successful payments can be refunded.
    #[error("payment for order {order_id} is {status}, not refundable")]
    NotRefundable {
        order_id: OrderId,
        status: PaymentStatus,
    },

    /// The gateway could not deliver a verdict.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The message bus rejected a publish.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Convenience alias for billing results.
pub type Result<T> = std::result::Result<T, BillingError>;
