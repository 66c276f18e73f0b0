//! Payment persistence boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::payment::Payment;

/// Errors raised by the payment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No payment exists for the given order.
    #[error("no payment for order {0}")]
    NotFound(OrderId),
}

/// Document-store boundary for payments, keyed by order.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts or replaces the payment for its order.
    async fn upsert(&self, payment: Payment) -> Result<Payment, StoreError>;

    /// Finds the payment for an order.
    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Payment>, StoreError>;

    /// Returns all payments.
    async fn find_all(&self) -> Result<Vec<Payment>, StoreError>;
}

/// In-memory payment store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<OrderId, Payment>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored payments.
    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn upsert(&self, payment: Payment) -> Result<Payment, StoreError> {
        self.payments
            .write()
            .await
            .insert(payment.order_id, payment.clone());
        Ok(payment)
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Payment>, StoreError> {
        Ok(self.payments.read().await.get(&order_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Payment>, StoreError> {
        Ok(self.payments.read().await.values().cloned().collect())
    }
}
