//! Order persistence boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::order::Order;

/// Errors raised by the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order exists with the given ID.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The stored version differs from the one the caller read.
    #[error("version conflict on order {0}")]
    VersionConflict(OrderId),

    /// An order with this ID already exists.
    #[error("order {0} already exists")]
    DuplicateId(OrderId),
}

/// Document-store boundary for orders: create, find, atomic update.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    async fn create(&self, order: Order) -> Result<Order, StoreError>;

    /// Finds an order by ID.
    async fn find(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Returns all orders.
    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Atomically replaces an order, conditional on its version.
    ///
    /// Succeeds only when the stored version equals `order.version`; the
    /// stored copy then carries `version + 1`. A mismatch is a retryable
    /// [`StoreError::VersionConflict`], distinct from a transition rejection.
    async fn update(&self, order: Order) -> Result<Order, StoreError>;
}

/// In-memory order store with the same semantics as a document database.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StoreError::DuplicateId(order.id));
        }
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().await.values().cloned().collect())
    }

    async fn update(&self, mut order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let stored = orders.get(&order.id).ok_or(StoreError::NotFound(order.id))?;

        if stored.version != order.version {
            return Err(StoreError::VersionConflict(order.id));
        }

        order.version += 1;
        orders.insert(order.id, order.clone());
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{CreateOrder, OrderItem};
    use crate::status::OrderStatus;

    fn sample_order() -> Order {
        Order::new(CreateOrder {
            items: vec![OrderItem::new("SKU-001", 1, 10.0)],
            address: "1 Main St".to_string(),
            phone_number: "+10000000000".to_string(),
        })
    }

    #[tokio::test]
    async fn create_and_find() {
        let store = InMemoryOrderStore::new();
        let order = store.create(sample_order()).await.unwrap();

        let found = store.find(order.id).await.unwrap().unwrap();
        assert_eq!(found, order);
        assert!(store.find(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = InMemoryOrderStore::new();
        let order = store.create(sample_order()).await.unwrap();

        let result = store.create(order).await;
        assert!(matches!(result, Err(StoreError::DuplicateId(_))));
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = InMemoryOrderStore::new();
        let mut order = store.create(sample_order()).await.unwrap();

        order.apply_status(OrderStatus::Confirmed, None).unwrap();
        let updated = store.update(order).await.unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(updated.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let store = InMemoryOrderStore::new();
        let order = store.create(sample_order()).await.unwrap();

        // Two readers load version 0; the second writer loses.
        let mut first = order.clone();
        first.apply_status(OrderStatus::Confirmed, None).unwrap();
        store.update(first).await.unwrap();

        let mut second = order;
        second.apply_status(OrderStatus::Cancelled, None).unwrap();
        let result = store.update(second).await;
        assert!(matches!(result, Err(StoreError::VersionConflict(_))));
    }

    #[tokio::test]
    async fn update_missing_order_is_not_found() {
        let store = InMemoryOrderStore::new();
        let result = store.update(sample_order()).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
