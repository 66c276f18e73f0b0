//! Shared identifier types used across the order saga services.

mod types;

pub use types::{OrderId, Sku};
