//! Webhook error types.
//!
//! Everything here is terminal for the delivery attempt: these errors occur
//! before an event is authenticated and parsed, so the caller answers 400
//! and the provider's redelivery policy takes over. Failures that happen
//! after authentication (metadata resolution) are logged inside the
//! pipeline instead and never become response errors.

use thiserror::Error;

/// Errors that occur before a webhook event is acknowledged.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header is missing entirely.
    #[error("Missing signature header")]
    MissingSignature,

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event timestamp is older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Test-mode event delivered to a deployment that requires livemode.
    #[error("Test mode events not allowed")]
    LivemodeMismatch,

    /// Failed to parse the signature header or the JSON payload.
    #[error("Parse error: {0}")]
    ParseError(String),
}
