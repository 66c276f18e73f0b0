//! Shipment persistence boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::shipment::Shipment;

/// Errors raised by the shipment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No shipment exists for the given order.
    #[error("no shipment for order {0}")]
    NotFound(OrderId),
}

/// Document-store boundary for shipments, keyed by order.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Inserts or replaces the shipment for its order.
    async fn upsert(&self, shipment: Shipment) -> Result<Shipment, StoreError>;

    /// Finds the shipment for an order.
    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Shipment>, StoreError>;

    /// Finds a shipment by tracking number.
    async fn find_by_tracking(&self, tracking: &str) -> Result<Option<Shipment>, StoreError>;

    /// Returns all shipments.
    async fn find_all(&self) -> Result<Vec<Shipment>, StoreError>;
}

/// In-memory shipment store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShipmentStore {
    shipments: Arc<RwLock<HashMap<OrderId, Shipment>>>,
}

impl InMemoryShipmentStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored shipments.
    pub async fn shipment_count(&self) -> usize {
        self.shipments.read().await.len()
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn upsert(&self, shipment: Shipment) -> Result<Shipment, StoreError> {
        self.shipments
            .write()
            .await
            .insert(shipment.order_id, shipment.clone());
        Ok(shipment)
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<Shipment>, StoreError> {
        Ok(self.shipments.read().await.get(&order_id).cloned())
    }

    async fn find_by_tracking(&self, tracking: &str) -> Result<Option<Shipment>, StoreError> {
        Ok(self
            .shipments
            .read()
            .await
            .values()
            .find(|s| s.tracking_number.as_deref() == Some(tracking))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Shipment>, StoreError> {
        Ok(self.shipments.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_by_order() {
        let store = InMemoryShipmentStore::new();
        let shipment = store
            .upsert(Shipment::new(OrderId::new(), "1 Main St"))
            .await
            .unwrap();

        store.upsert(shipment.clone().shipped()).await.unwrap();
        assert_eq!(store.shipment_count().await, 1);

        let stored = store.find_by_order(shipment.order_id).await.unwrap().unwrap();
        assert!(stored.tracking_number.is_some());
    }

    #[tokio::test]
    async fn find_by_tracking_matches_assigned_number() {
        let store = InMemoryShipmentStore::new();
        let shipment = store
            .upsert(Shipment::new(OrderId::new(), "1 Main St").shipped())
            .await
            .unwrap();

        let tracking = shipment.tracking_number.as_deref().unwrap();
        let found = store.find_by_tracking(tracking).await.unwrap().unwrap();
        assert_eq!(found.order_id, shipment.order_id);

        assert!(store.find_by_tracking("TN-unknown").await.unwrap().is_none());
    }
}
