//! Inventory error taxonomy.

use common::Sku;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// No product exists with the given SKU.
    #[error("product with sku {0} not found")]
    ProductNotFound(Sku),

    /// A product with this SKU already exists.
    #[error("product with sku {0} already exists")]
    DuplicateSku(Sku),

    /// Available stock cannot cover the requested quantity.
    #[error("insufficient stock for {sku}: {available} available, {requested} requested")]
    InsufficientStock {
        sku: Sku,
        available: u32,
        requested: u32,
    },

    /// Concurrent writers raced on the same product document.
    #[error("version conflict on product {0}")]
    VersionConflict(Sku),
}

impl From<StoreError> for InventoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ProductNotFound(sku) => Self::ProductNotFound(sku),
            StoreError::DuplicateSku(sku) => Self::DuplicateSku(sku),
            StoreError::VersionConflict(sku) => Self::VersionConflict(sku),
        }
    }
}

/// Convenience alias for inventory results.
pub type Result<T> = std::result::Result<T, InventoryError>;
