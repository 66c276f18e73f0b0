//! Product and reservation documents.

use chrono::{DateTime, Duration, Utc};
use common::{OrderId, Sku};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a stock reservation is held before it may be reclaimed.
/// Expiry enforcement itself is a separate concern; the stamp is recorded
/// so a reaper can act on it.
pub const RESERVATION_TTL_HOURS: i64 = 24;

/// Unique identifier for a stock reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random reservation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hold on stock for one order line. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation identity.
    pub id: ReservationId,
    /// The order this hold belongs to (back-reference, not ownership).
    pub order_id: OrderId,
    /// Units held.
    pub quantity: u32,
    /// When the hold lapses.
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    /// Creates a reservation expiring after the standard TTL.
    pub fn new(order_id: OrderId, quantity: u32) -> Self {
        Self {
            id: ReservationId::new(),
            order_id,
            quantity,
            expires_at: Utc::now() + Duration::hours(RESERVATION_TTL_HOURS),
        }
    }
}

/// A stocked product.
///
/// `quantity` is available stock and is never allowed to go negative;
/// reservations are linked by ID, not owned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identity.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique business key.
    pub sku: Sku,
    /// Units available, decremented on reservation.
    pub quantity: u32,
    /// Active reservation references.
    pub reservations: Vec<ReservationId>,
    /// Document version for optimistic concurrency control.
    pub version: u64,
}

impl Product {
    /// Creates a new product with the given starting stock.
    pub fn new(name: impl Into<String>, sku: impl Into<Sku>, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sku: sku.into(),
            quantity,
            reservations: Vec::new(),
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_expires_after_ttl() {
        let before = Utc::now() + Duration::hours(RESERVATION_TTL_HOURS);
        let reservation = Reservation::new(OrderId::new(), 3);
        let after = Utc::now() + Duration::hours(RESERVATION_TTL_HOURS);

        assert!(reservation.expires_at >= before);
        assert!(reservation.expires_at <= after);
        assert_eq!(reservation.quantity, 3);
    }

    #[test]
    fn new_product_has_no_reservations() {
        let product = Product::new("Widget", "SKU-001", 10);
        assert_eq!(product.quantity, 10);
        assert!(product.reservations.is_empty());
        assert_eq!(product.version, 0);
    }

    #[test]
    fn product_serialization_roundtrip() {
        let product = Product::new("Widget", "SKU-001", 10);
        let json = serde_json::to_string(&product).unwrap();
        let deserialized: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(product, deserialized);
    }
}
