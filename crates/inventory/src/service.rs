//! Inventory service: stock management and the reservation step.

use common::Sku;
use messaging::events::{ReservationItem, ReserveReply, ReserveStockRequest};
use messaging::ReserveCall;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::{InventoryError, Result};
use crate::product::{Product, Reservation};
use crate::store::{ProductStore, ReservationStore, StoreError};

/// How many times a conflicted product write is retried before giving up.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Input for registering a new product.
#[derive(Debug, Clone)]
pub struct AddProduct {
    pub name: String,
    pub sku: Sku,
    pub quantity: u32,
}

/// Owns products and reservations and answers reservation calls.
///
/// Reservation is all-or-nothing per request: items are applied one at a
/// time, and when a later item fails every previously applied item is
/// released again before the failure is reported.
#[derive(Debug, Clone)]
pub struct InventoryService<P, R> {
    products: P,
    reservations: R,
}

impl<P, R> InventoryService<P, R>
where
    P: ProductStore,
    R: ReservationStore,
{
    /// Creates a service over the given stores.
    pub fn new(products: P, reservations: R) -> Self {
        Self {
            products,
            reservations,
        }
    }

    /// Registers a new product.
    #[tracing::instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn add_product(&self, input: AddProduct) -> Result<Product> {
        let product = self
            .products
            .create(Product::new(input.name, input.sku, input.quantity))
            .await?;
        tracing::info!(sku = %product.sku, quantity = product.quantity, "product added");
        Ok(product)
    }

    /// Returns all products.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.find_all().await?)
    }

    /// Returns all active reservations.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        Ok(self.reservations.find_all().await?)
    }

    /// Consumes reservation calls until the channel closes.
    pub async fn run(self, mut calls: UnboundedReceiver<ReserveCall>) {
        while let Some(call) = calls.recv().await {
            self.handle(call).await;
        }
    }

    /// Answers one reservation call.
    ///
    /// Every outcome is turned into a reply: the requester treats a missing
    /// reply as a failure anyway, but an explicit verdict settles the call
    /// immediately instead of letting the requester wait out its deadline.
    #[tracing::instrument(skip(self, call), fields(order_id = %call.request().order_id))]
    pub async fn handle(&self, call: ReserveCall) {
        let success = match self.reserve(call.request()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::info!(
                    order_id = %call.request().order_id,
                    error = %e,
                    "reservation rejected"
                );
                false
            }
        };

        let result = if success { "reserved" } else { "rejected" };
        metrics::counter!("inventory_reservations_total", "result" => result).increment(1);
        call.reply(ReserveReply { success });
    }

    /// Reserves stock for every item in the request, or nothing.
    pub async fn reserve(&self, request: &ReserveStockRequest) -> Result<()> {
        let mut applied: Vec<(Sku, Reservation)> = Vec::new();

        for item in &request.items {
            match self.reserve_item(request, item).await {
                Ok(reservation) => applied.push((item.sku.clone(), reservation)),
                Err(e) => {
                    self.release(&applied).await;
                    return Err(e);
                }
            }
        }

        tracing::info!(
            order_id = %request.order_id,
            items = request.items.len(),
            "stock reserved"
        );
        Ok(())
    }

    /// Applies a single line: decrements stock and records the hold.
    async fn reserve_item(
        &self,
        request: &ReserveStockRequest,
        item: &ReservationItem,
    ) -> Result<Reservation> {
        let reservation = self
            .reservations
            .create(Reservation::new(request.order_id, item.quantity))
            .await?;

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut product = match self.products.find_by_sku(&item.sku).await {
                Ok(Some(product)) => product,
                Ok(None) => {
                    self.discard_reservation(&reservation).await;
                    return Err(InventoryError::ProductNotFound(item.sku.clone()));
                }
                Err(e) => {
                    self.discard_reservation(&reservation).await;
                    return Err(e.into());
                }
            };

            if product.quantity < item.quantity {
                let err = InventoryError::InsufficientStock {
                    sku: item.sku.clone(),
                    available: product.quantity,
                    requested: item.quantity,
                };
                self.discard_reservation(&reservation).await;
                return Err(err);
            }

            product.quantity -= item.quantity;
            product.reservations.push(reservation.id);

            match self.products.update(product).await {
                Ok(_) => return Ok(reservation),
                Err(StoreError::VersionConflict(_)) if attempt < MAX_UPDATE_ATTEMPTS => {
                    tracing::debug!(sku = %item.sku, attempt, "retrying conflicted stock update");
                }
                Err(e) => {
                    self.discard_reservation(&reservation).await;
                    return Err(e.into());
                }
            }
        }

        self.discard_reservation(&reservation).await;
        Err(InventoryError::VersionConflict(item.sku.clone()))
    }

    /// Releases already-applied items in reverse order.
    ///
    /// Release is best-effort: a failure here is logged and the walk
    /// continues, since leaving the remaining items held would be worse.
    async fn release(&self, applied: &[(Sku, Reservation)]) {
        for (sku, reservation) in applied.iter().rev() {
            if let Err(e) = self.release_item(sku, reservation).await {
                tracing::warn!(%sku, error = %e, "failed to release reservation");
            }
        }
    }

    async fn release_item(&self, sku: &Sku, reservation: &Reservation) -> Result<()> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut product = self
                .products
                .find_by_sku(sku)
                .await?
                .ok_or_else(|| InventoryError::ProductNotFound(sku.clone()))?;

            product.quantity += reservation.quantity;
            product.reservations.retain(|id| *id != reservation.id);

            match self.products.update(product).await {
                Ok(_) => break,
                Err(StoreError::VersionConflict(_)) if attempt < MAX_UPDATE_ATTEMPTS => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.reservations.delete(reservation.id).await?;
        Ok(())
    }

    /// Drops a reservation row whose stock decrement never landed.
    async fn discard_reservation(&self, reservation: &Reservation) {
        if let Err(e) = self.reservations.delete(reservation.id).await {
            tracing::warn!(reservation_id = %reservation.id, error = %e, "failed to discard reservation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryProductStore, InMemoryReservationStore};
    use common::OrderId;
    use messaging::InMemoryBus;

    fn service() -> InventoryService<InMemoryProductStore, InMemoryReservationStore> {
        InventoryService::new(InMemoryProductStore::new(), InMemoryReservationStore::new())
    }

    async fn stocked(
        svc: &InventoryService<InMemoryProductStore, InMemoryReservationStore>,
        sku: &str,
        quantity: u32,
    ) {
        svc.add_product(AddProduct {
            name: format!("Product {sku}"),
            sku: sku.into(),
            quantity,
        })
        .await
        .unwrap();
    }

    fn request(items: Vec<ReservationItem>) -> ReserveStockRequest {
        ReserveStockRequest {
            order_id: OrderId::new(),
            items,
        }
    }

    #[tokio::test]
    async fn add_product_rejects_duplicate_sku() {
        let svc = service();
        stocked(&svc, "SKU-001", 10).await;

        let result = svc
            .add_product(AddProduct {
                name: "Again".to_string(),
                sku: "SKU-001".into(),
                quantity: 5,
            })
            .await;
        assert!(matches!(result, Err(InventoryError::DuplicateSku(_))));
    }

    #[tokio::test]
    async fn reserve_decrements_stock_and_records_hold() {
        let svc = service();
        stocked(&svc, "SKU-001", 10).await;

        svc.reserve(&request(vec![ReservationItem::new("SKU-001", 4)]))
            .await
            .unwrap();

        let products = svc.list_products().await.unwrap();
        assert_eq!(products[0].quantity, 6);
        assert_eq!(products[0].reservations.len(), 1);

        let reservations = svc.list_reservations().await.unwrap();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].quantity, 4);
        assert_eq!(reservations[0].id, products[0].reservations[0]);
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_product_untouched() {
        let svc = service();
        stocked(&svc, "SKU-001", 2).await;

        let result = svc
            .reserve(&request(vec![ReservationItem::new("SKU-001", 5)]))
            .await;
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock {
                available: 2,
                requested: 5,
                ..
            })
        ));

        let products = svc.list_products().await.unwrap();
        assert_eq!(products[0].quantity, 2);
        assert!(products[0].reservations.is_empty());
        assert!(svc.list_reservations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_sku_fails_reservation() {
        let svc = service();
        let result = svc
            .reserve(&request(vec![ReservationItem::new("missing", 1)]))
            .await;
        assert!(matches!(result, Err(InventoryError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn partial_failure_releases_already_applied_items() {
        let svc = service();
        stocked(&svc, "SKU-001", 10).await;
        stocked(&svc, "SKU-002", 1).await;

        let result = svc
            .reserve(&request(vec![
                ReservationItem::new("SKU-001", 4),
                ReservationItem::new("SKU-002", 3),
            ]))
            .await;
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientStock { .. })
        ));

        // The first item's hold must have been rolled back.
        let mut products = svc.list_products().await.unwrap();
        products.sort_by(|a, b| a.sku.as_str().cmp(b.sku.as_str()));
        assert_eq!(products[0].quantity, 10);
        assert!(products[0].reservations.is_empty());
        assert_eq!(products[1].quantity, 1);
        assert!(svc.list_reservations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handle_replies_with_the_verdict() {
        let svc = service();
        stocked(&svc, "SKU-001", 10).await;

        let (bus, mut consumers) = InMemoryBus::new();
        let responder = {
            let svc = svc.clone();
            tokio::spawn(async move {
                for _ in 0..2 {
                    let call = consumers.reserve.recv().await.unwrap();
                    svc.handle(call).await;
                }
            })
        };

        use messaging::MessageBus;
        let ok = bus
            .reserve_stock(request(vec![ReservationItem::new("SKU-001", 3)]))
            .await
            .unwrap();
        assert!(ok.success);

        let rejected = bus
            .reserve_stock(request(vec![ReservationItem::new("missing", 1)]))
            .await
            .unwrap();
        assert!(!rejected.success);

        responder.await.unwrap();
    }
}
