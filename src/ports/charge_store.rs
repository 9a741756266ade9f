//! Charge store port - Reads and metadata writes for payment objects.
//!
//! This is the narrow contract the webhook pipeline depends on. It covers
//! the lookups metadata resolution needs plus the single write it performs
//! (pushing metadata onto a charge). The wider `PaymentGateway` trait
//! extends it for the request/response endpoints.

use async_trait::async_trait;

use crate::domain::payment::{Charge, Metadata, PaymentIntent, PaymentsError};

/// Port for reading payment objects and updating charge metadata.
#[async_trait]
pub trait ChargeStore: Send + Sync {
    /// Fetch a payment intent by provider ID.
    async fn retrieve_payment_intent(&self, intent_id: &str)
        -> Result<PaymentIntent, GatewayError>;

    /// Fetch a charge by provider ID.
    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, GatewayError>;

    /// List charges belonging to a payment intent, newest first.
    async fn list_charges(
        &self,
        payment_intent_id: &str,
        limit: u8,
    ) -> Result<Vec<Charge>, GatewayError>;

    /// Replace the metadata on a charge.
    ///
    /// The provider merges key-by-key, so callers that want strict
    /// replacement must send every key they care about.
    async fn update_charge_metadata(
        &self,
        charge_id: &str,
        metadata: &Metadata,
    ) -> Result<Charge, GatewayError>;
}

/// Error category for gateway failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// Connection failed or was interrupted.
    Network,

    /// The request timed out.
    Timeout,

    /// The provider rejected the request for rate limiting.
    RateLimited,

    /// The referenced object does not exist.
    NotFound,

    /// The provider returned an application-level error.
    Provider,

    /// The provider response could not be decoded.
    Parse,
}

impl GatewayErrorCode {
    /// Whether errors of this category are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::Timeout | Self::RateLimited)
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network_error",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::NotFound => "not_found",
            Self::Provider => "provider_error",
            Self::Parse => "parse_error",
        };
        f.write_str(name)
    }
}

/// Error returned by gateway operations.
#[derive(Debug, Clone)]
pub struct GatewayError {
    /// Error category.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(GatewayErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Provider, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Parse, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for PaymentsError {
    fn from(err: GatewayError) -> Self {
        match err.code {
            GatewayErrorCode::NotFound => PaymentsError::NotFound(err.message),
            _ => PaymentsError::Remote {
                message: err.message,
                retryable: err.retryable,
            },
        }
    }
}
