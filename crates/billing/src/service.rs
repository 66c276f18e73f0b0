//! Billing service: payment processing and outcome events.

use common::OrderId;
use messaging::events::{OrdersEvent, PaymentRequest};
use messaging::{Delivery, EventConsumer, MessageBus};

use crate::error::{BillingError, Result};
use crate::gateway::PaymentGateway;
use crate::payment::{Payment, PaymentStatus};
use crate::store::PaymentStore;

/// Processes payment requests and reports verdicts to the orders channel.
///
/// Payment requests are acknowledged unconditionally: the payment document
/// is the durable record of what happened, and redelivering a request the
/// gateway already answered would charge twice. A replayed request for an
/// already-processed payment re-emits the stored verdict without touching
/// the gateway again.
#[derive(Debug, Clone)]
pub struct BillingService<S, G, B> {
    payments: S,
    gateway: G,
    bus: B,
}

impl<S, G, B> BillingService<S, G, B>
where
    S: PaymentStore,
    G: PaymentGateway,
    B: MessageBus,
{
    /// Creates a service over the given store, gateway, and bus.
    pub fn new(payments: S, gateway: G, bus: B) -> Self {
        Self {
            payments,
            gateway,
            bus,
        }
    }

    /// Consumes payment requests until the channel closes.
    pub async fn run(self, mut consumer: EventConsumer<PaymentRequest>) {
        while let Some(delivery) = consumer.recv().await {
            self.handle(delivery).await;
        }
    }

    /// Processes one payment request and settles the delivery.
    #[tracing::instrument(skip(self, delivery), fields(order_id = %delivery.event().order_id))]
    pub async fn handle(&self, delivery: Delivery<PaymentRequest>) {
        let request = delivery.event().clone();

        let outcome = match self.bill(&request).await {
            Ok(payment) => {
                metrics::counter!("billing_payments_total", "status" => payment.status.as_str())
                    .increment(1);
                match payment.status {
                    PaymentStatus::Successful => Some(OrdersEvent::PaymentSuccessful {
                        order_id: request.order_id,
                    }),
                    PaymentStatus::Failed => Some(OrdersEvent::PaymentFailed {
                        order_id: request.order_id,
                    }),
                    // A replayed request for a refunded payment has nothing
                    // left to report.
                    PaymentStatus::Pending | PaymentStatus::Refunded => None,
                }
            }
            Err(e) => {
                tracing::warn!(order_id = %request.order_id, error = %e, "payment processing failed");
                Some(OrdersEvent::PaymentFailed {
                    order_id: request.order_id,
                })
            }
        };

        if let Some(event) = outcome {
            if let Err(e) = self.bus.notify_orders(event).await {
                tracing::warn!(
                    order_id = %request.order_id,
                    error = %e,
                    "failed to publish payment outcome"
                );
            }
        }

        delivery.ack();
    }

    /// Records the payment and obtains the gateway verdict.
    ///
    /// A gateway error is a decline: no verdict means no charge, and the
    /// payment is recorded as failed rather than left pending.
    async fn bill(&self, request: &PaymentRequest) -> Result<Payment> {
        if let Some(existing) = self.payments.find_by_order(request.order_id).await? {
            if existing.status != PaymentStatus::Pending {
                tracing::info!(
                    order_id = %request.order_id,
                    status = %existing.status,
                    "payment already processed, re-emitting verdict"
                );
                return Ok(existing);
            }
        }

        let pending = self
            .payments
            .upsert(Payment::new(request.order_id, request.total_price))
            .await?;

        let status = match self.gateway.verify(request).await {
            Ok(true) => PaymentStatus::Successful,
            Ok(false) => PaymentStatus::Failed,
            Err(e) => {
                tracing::warn!(order_id = %request.order_id, error = %e, "gateway unavailable");
                PaymentStatus::Failed
            }
        };

        let payment = self.payments.upsert(pending.processed(status)).await?;
        tracing::info!(
            order_id = %payment.order_id,
            status = %payment.status,
            amount = payment.amount,
            "payment processed"
        );
        Ok(payment)
    }

    /// Refunds a successful payment.
    #[tracing::instrument(skip(self))]
    pub async fn refund(&self, order_id: OrderId) -> Result<Payment> {
        let payment = self
            .payments
            .find_by_order(order_id)
            .await?
            .ok_or(BillingError::PaymentNotFound(order_id))?;

        if payment.status != PaymentStatus::Successful {
            return Err(BillingError::NotRefundable {
                order_id,
                status: payment.status,
            });
        }

        let refunded = self
            .payments
            .upsert(payment.processed(PaymentStatus::Refunded))
            .await?;
        tracing::info!(%order_id, "payment refunded");
        Ok(refunded)
    }

    /// Returns the payment for an order.
    pub async fn get_payment(&self, order_id: OrderId) -> Result<Payment> {
        self.payments
            .find_by_order(order_id)
            .await?
            .ok_or(BillingError::PaymentNotFound(order_id))
    }

    /// Returns all payments.
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.payments.find_all().await?)
    }
}
