//! Payment gateway port for the full provider surface.
//!
//! Extends `ChargeStore` with the operations the request/response
//! endpoints need: hosted checkout, session lookups, and refunds.
//! Implementations must be safe to call concurrently.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::charge_store::{ChargeStore, GatewayError};
use crate::domain::payment::{CheckoutSession, Metadata, Refund};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentGateway: ChargeStore {
    /// Create a hosted checkout session.
    ///
    /// Returns the session with a redirect URL for the customer.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Fetch a checkout session by provider ID.
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Issue a refund against a charge.
    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, GatewayError>;

    /// List refunds issued against a charge, newest first.
    async fn list_refunds(&self, charge_id: &str) -> Result<Vec<Refund>, GatewayError>;
}

/// Request to create a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    /// Provider price ID to sell. When absent the gateway falls back to
    /// its configured inline price.
    pub price_id: Option<String>,

    /// Metadata stamped on both the session and its payment intent.
    pub metadata: Metadata,

    /// Checkout page locale (e.g. "en", "de").
    pub locale: String,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,
}

/// Request to refund a charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefundRequest {
    /// Provider charge ID to refund.
    pub charge_id: String,

    /// Amount in minor units. `None` refunds the full charge.
    pub amount_minor: Option<i64>,

    /// Optional provider reason code.
    pub reason: Option<String>,
}
