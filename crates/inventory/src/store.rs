//! Inventory persistence boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::Sku;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::product::{Product, Reservation, ReservationId};

/// Errors raised by the inventory stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No product exists with the given SKU.
    #[error("product with sku {0} not found")]
    ProductNotFound(Sku),

    /// A product with this SKU already exists.
    #[error("product with sku {0} already exists")]
    DuplicateSku(Sku),

    /// The stored version differs from the one the caller read.
    #[error("version conflict on product {0}")]
    VersionConflict(Sku),
}

/// Document-store boundary for products, keyed by SKU.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a new product; the SKU must be unused.
    async fn create(&self, product: Product) -> Result<Product, StoreError>;

    /// Finds a product by SKU.
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, StoreError>;

    /// Returns all products.
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Atomically replaces a product, conditional on its version.
    async fn update(&self, product: Product) -> Result<Product, StoreError>;
}

/// Document-store boundary for reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persists a new reservation.
    async fn create(&self, reservation: Reservation) -> Result<Reservation, StoreError>;

    /// Returns all reservations.
    async fn find_all(&self) -> Result<Vec<Reservation>, StoreError>;

    /// Removes a reservation. Removing an unknown ID is a no-op.
    async fn delete(&self, id: ReservationId) -> Result<(), StoreError>;
}

/// In-memory product store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<Sku, Product>>>,
}

impl InMemoryProductStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: Product) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.sku) {
            return Err(StoreError::DuplicateSku(product.sku.clone()));
        }
        products.insert(product.sku.clone(), product.clone());
        Ok(product)
    }

    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(sku).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.values().cloned().collect())
    }

    async fn update(&self, mut product: Product) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let stored = products
            .get(&product.sku)
            .ok_or_else(|| StoreError::ProductNotFound(product.sku.clone()))?;

        if stored.version != product.version {
            return Err(StoreError::VersionConflict(product.sku.clone()));
        }

        product.version += 1;
        products.insert(product.sku.clone(), product.clone());
        Ok(product)
    }
}

/// In-memory reservation store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationStore {
    reservations: Arc<RwLock<HashMap<ReservationId, Reservation>>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored reservations.
    pub async fn reservation_count(&self) -> usize {
        self.reservations.read().await.len()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn create(&self, reservation: Reservation) -> Result<Reservation, StoreError> {
        self.reservations
            .write()
            .await
            .insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn find_all(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.reservations.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: ReservationId) -> Result<(), StoreError> {
        self.reservations.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;

    #[tokio::test]
    async fn create_and_find_by_sku() {
        let store = InMemoryProductStore::new();
        let product = store.create(Product::new("Widget", "SKU-001", 10)).await.unwrap();

        let found = store.find_by_sku(&Sku::new("SKU-001")).await.unwrap().unwrap();
        assert_eq!(found, product);
        assert!(store.find_by_sku(&Sku::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_sku_is_rejected() {
        let store = InMemoryProductStore::new();
        store.create(Product::new("Widget", "SKU-001", 10)).await.unwrap();

        let result = store.create(Product::new("Other", "SKU-001", 5)).await;
        assert!(matches!(result, Err(StoreError::DuplicateSku(_))));
    }

    #[tokio::test]
    async fn update_bumps_version_and_detects_conflicts() {
        let store = InMemoryProductStore::new();
        let product = store.create(Product::new("Widget", "SKU-001", 10)).await.unwrap();

        let mut first = product.clone();
        first.quantity = 8;
        let updated = store.update(first).await.unwrap();
        assert_eq!(updated.version, 1);

        let mut stale = product;
        stale.quantity = 3;
        let result = store.update(stale).await;
        assert!(matches!(result, Err(StoreError::VersionConflict(_))));
    }

    #[tokio::test]
    async fn reservation_create_and_delete() {
        let store = InMemoryReservationStore::new();
        let reservation = store
            .create(Reservation::new(OrderId::new(), 4))
            .await
            .unwrap();
        assert_eq!(store.reservation_count().await, 1);

        store.delete(reservation.id).await.unwrap();
        assert_eq!(store.reservation_count().await, 0);

        // Deleting again is a no-op.
        store.delete(reservation.id).await.unwrap();
    }
}
