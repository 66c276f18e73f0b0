//! Orders service: creation, queries, and validated status updates.

use common::OrderId;
use messaging::{MessageBus, PaymentRequest, ReserveStockRequest};

use crate::error::{OrdersError, Result};
use crate::order::{CreateOrder, Order, StatusEntry};
use crate::status::OrderStatus;
use crate::store::{OrderStore, StoreError};

/// Bounded retries for version-conflicted read-modify-write cycles.
const MAX_UPDATE_ATTEMPTS: u32 = 3;

/// Service owning the order lifecycle.
///
/// All status mutations funnel through [`update_order_status`]
/// (Self::update_order_status), which is the only writer of `Order.status`.
#[derive(Debug, Clone)]
pub struct OrdersService<S, B> {
    store: S,
    bus: B,
}

impl<S, B> OrdersService<S, B>
where
    S: OrderStore,
    B: MessageBus,
{
    /// Creates a new orders service over the given store and bus handle.
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

    /// Returns the bus handle, for emitting follow-on saga events.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Creates an order and runs the synchronous reservation leg of the saga.
    ///
    /// The order is persisted in `created` status, then inventory is asked to
    /// reserve stock via request/reply: the caller needs a definite verdict
    /// before deciding between `confirmed` and `cancelled`. A successful
    /// reservation confirms the order and fires the payment request; any
    /// failure (including transport failure) cancels it. The returned order
    /// reflects whichever branch executed.
    #[tracing::instrument(skip(self, request), fields(total_items = request.items.len()))]
    pub async fn create_order(&self, request: CreateOrder) -> Result<Order> {
        let order = self.store.create(Order::new(request)).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, total_price = order.total_price, "order created");

        let reservation = self
            .bus
            .reserve_stock(ReserveStockRequest {
                order_id: order.id,
                items: order.reservation_items(),
            })
            .await;

        match reservation {
            Ok(reply) if reply.success => {
                let confirmed = self
                    .update_order_status(
                        order.id,
                        OrderStatus::Confirmed,
                        Some("Inventory reserved".to_string()),
                    )
                    .await?;

                // Fire-and-forget: a lost payment request is logged, not fatal
                // to the create call. The order stays confirmed and can be
                // re-billed administratively.
                if let Err(e) = self
                    .bus
                    .request_payment(PaymentRequest {
                        order_id: confirmed.id,
                        total_price: confirmed.total_price,
                        phone_number: confirmed.phone_number.clone(),
                    })
                    .await
                {
                    tracing::error!(order_id = %confirmed.id, error = %e, "failed to emit payment request");
                }

                Ok(confirmed)
            }
            outcome => {
                match outcome {
                    Err(e) => {
                        tracing::warn!(order_id = %order.id, error = %e, "reservation transport failure, cancelling")
                    }
                    _ => tracing::info!(order_id = %order.id, "inventory unavailable, cancelling"),
                }
                metrics::counter!("orders_cancelled_at_reservation_total").increment(1);
                self.update_order_status(
                    order.id,
                    OrderStatus::Cancelled,
                    Some("Inventory unavailable".to_string()),
                )
                .await
            }
        }
    }

    /// Applies one validated status transition and persists it.
    ///
    /// Retries a bounded number of times on version conflicts (concurrent
    /// writer won the compare-and-swap); a transition table rejection is
    /// final and leaves the order untouched. Safe to retry at the message
    /// level: a replayed transition fails with `InvalidTransition` because
    /// the stored status has already advanced.
    #[tracing::instrument(skip(self, comment))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        comment: Option<String>,
    ) -> Result<Order> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut order = self
                .store
                .find(order_id)
                .await?
                .ok_or(OrdersError::NotFound(order_id))?;
            order.apply_status(new_status, comment.clone())?;

            match self.store.update(order).await {
                Ok(updated) => {
                    metrics::counter!(
                        "order_status_transitions_total",
                        "status" => new_status.as_str(),
                    )
                    .increment(1);
                    tracing::info!(%order_id, status = %new_status, "order status updated");
                    return Ok(updated);
                }
                Err(StoreError::VersionConflict(_)) if attempt < MAX_UPDATE_ATTEMPTS => {
                    tracing::debug!(%order_id, attempt, "version conflict, retrying status update");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Returns an order by ID.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .find(order_id)
            .await?
            .ok_or(OrdersError::NotFound(order_id))
    }

    /// Returns all orders.
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.find_all().await?)
    }

    /// Returns the status history of an order.
    pub async fn status_history(&self, order_id: OrderId) -> Result<Vec<StatusEntry>> {
        Ok(self.get_order(order_id).await?.status_history)
    }
}
