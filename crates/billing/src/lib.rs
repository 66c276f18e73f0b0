//! Billing participant.
//!
//! Consumes payment requests, runs them past the gateway, records the
//! payment document, and reports the verdict back on the orders channel as
//! a payment-successful or payment-failed event.

pub mod error;
pub mod gateway;
pub mod payment;
pub mod service;
pub mod store;

pub use error::BillingError;
pub use gateway::{GatewayError, PaymentGateway, StaticGateway};
pub use payment::{Payment, PaymentStatus};
pub use service::BillingService;
pub use store::{InMemoryPaymentStore, PaymentStore, StoreError};
