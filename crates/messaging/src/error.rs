//! Transport error types.

use thiserror::Error;

/// Errors raised by the message bus.
///
/// A transport failure on a request/reply call is always treated as a
/// negative outcome by callers, never as success.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Publishing to a channel failed (broker unavailable or channel closed).
    #[error("publish to {0} channel failed")]
    PublishFailed(&'static str),

    /// No reply arrived within the configured deadline.
    #[error("no reply from {channel} within {timeout_ms} ms")]
    ReplyTimeout {
        channel: &'static str,
        timeout_ms: u64,
    },

    /// The responder dropped the reply handle without answering.
    #[error("reply channel dropped by {0}")]
    ReplyDropped(&'static str),
}

/// Convenience type alias for transport results.
pub type Result<T> = std::result::Result<T, TransportError>;
