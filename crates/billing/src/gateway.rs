//! Payment gateway boundary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use messaging::events::PaymentRequest;
use thiserror::Error;

/// Errors from the gateway itself, as opposed to a clean decline.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be reached or returned garbage.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(&'static str),
}

/// External payment processor.
///
/// `verify` returns the processor's verdict: `Ok(true)` is an approval,
/// `Ok(false)` a clean decline. Errors mean no verdict was obtained at all.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn verify(&self, request: &PaymentRequest) -> Result<bool, GatewayError>;
}

/// Gateway fake with a fixed verdict.
#[derive(Debug, Clone)]
pub struct StaticGateway {
    approve: Arc<AtomicBool>,
    fail: Arc<AtomicBool>,
}

impl StaticGateway {
    /// Creates a gateway that returns the given verdict.
    pub fn new(approve: bool) -> Self {
        Self {
            approve: Arc::new(AtomicBool::new(approve)),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates an approving gateway.
    pub fn approving() -> Self {
        Self::new(true)
    }

    /// Creates a declining gateway.
    pub fn declining() -> Self {
        Self::new(false)
    }

    /// Changes the verdict for subsequent calls.
    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    /// Makes subsequent calls error instead of returning a verdict.
    pub fn set_fail_on_verify(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for StaticGateway {
    async fn verify(&self, _request: &PaymentRequest) -> Result<bool, GatewayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Unavailable("static gateway"));
        }
        Ok(self.approve.load(Ordering::SeqCst))
    }
}
