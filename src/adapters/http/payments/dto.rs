//! HTTP DTOs for the payments API.
//!
//! These types define the JSON request/response structure and form the
//! boundary between HTTP and the application layer. Checkout and refund
//! endpoints use camelCase field names; `verify-session` mirrors the
//! provider's own snake_case shape because frontends pass it through.

use serde::{Deserialize, Serialize};

use crate::domain::payment::{CheckoutSession, Refund};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a checkout session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    #[serde(default)]
    pub price_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<CheckoutMetadata>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Caller-supplied metadata for a checkout session. All fields optional;
/// `userId`/`creditGranted` are remapped to `UserId`/`CreditGranted` before
/// being attached to the session.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMetadata {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub credit_granted: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Request to refund a session's charge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub session_id: String,
    /// Amount in major units (e.g. 12.50). Omit for a full refund.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query string for session-scoped GET endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionIdQuery {
    pub session_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a created checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

/// A single refund in API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundDto {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub created: i64,
}

impl From<Refund> for RefundDto {
    fn from(refund: Refund) -> Self {
        Self {
            id: refund.id,
            amount: refund.amount,
            currency: refund.currency,
            status: refund.status,
            reason: refund.reason,
            created: refund.created,
        }
    }
}

/// Response for an issued refund.
#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    pub success: bool,
    pub refund: RefundDto,
}

/// Response for refund history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundHistoryResponse {
    pub session_id: String,
    pub payment_status: String,
    pub refunds: Vec<RefundDto>,
}

/// Response for session verification. Snake_case by design.
#[derive(Debug, Clone, Serialize)]
pub struct VerifySessionResponse {
    pub id: String,
    pub payment_status: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
}

impl From<CheckoutSession> for VerifySessionResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            id: session.id,
            payment_status: session.payment_status,
            amount_total: session.amount_total,
            currency: session.currency,
            customer_email: session.customer_email,
        }
    }
}

/// Acknowledgment for a processed webhook delivery.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

impl WebhookAckResponse {
    pub fn ok() -> Self {
        Self { received: true }
    }
}

/// Error envelope for all endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
            },
        }
    }
}
