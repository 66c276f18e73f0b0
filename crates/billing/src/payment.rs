//! Payment document.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Created but not yet run past the gateway.
    Pending,
    /// Approved by the gateway.
    Successful,
    /// Declined by the gateway, or the gateway could not be reached.
    Failed,
    /// A previously successful payment that has been refunded.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment attempt for one order. One payment per order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment identity.
    pub id: Uuid,
    /// The order being paid for.
    pub order_id: OrderId,
    /// Amount charged.
    pub amount: f64,
    /// Current status.
    pub status: PaymentStatus,
    /// When the payment was first recorded.
    pub created_at: DateTime<Utc>,
    /// When the gateway verdict landed, if it has.
    pub processed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Creates a pending payment.
    pub fn new(order_id: OrderId, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    /// Stamps the gateway verdict onto the payment.
    pub fn processed(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self.processed_at = Some(Utc::now());
        self
    }
}
