//! Provider object snapshots.
//!
//! These are the slices of the provider's API objects that this service
//! actually reads. They double as the deserialization targets for webhook
//! payload objects and for provider API responses, so unknown fields are
//! always tolerated.

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// A payment intent - the provider's representation of an attempt to
/// collect payment, and the root of metadata in this design.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntent {
    /// Intent identifier (pi_...).
    pub id: String,

    /// Intent status (e.g. "succeeded", "requires_payment_method").
    #[serde(default)]
    pub status: String,

    /// Amount in currency minor units.
    #[serde(default)]
    pub amount: i64,

    /// Lowercase currency code.
    #[serde(default)]
    pub currency: String,

    /// Application metadata attached at checkout time.
    #[serde(default)]
    pub metadata: Metadata,
}

/// A charge - a specific settlement attempt against a payment intent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Charge {
    /// Charge identifier (ch_...).
    pub id: String,

    /// Identifier of the owning payment intent, when expanded as a string.
    #[serde(default)]
    pub payment_intent: Option<String>,

    /// Amount in currency minor units.
    #[serde(default)]
    pub amount: i64,

    /// Lowercase currency code.
    #[serde(default)]
    pub currency: String,

    /// Charge status (e.g. "succeeded").
    #[serde(default)]
    pub status: String,

    /// Metadata copy, empty until the pipeline writes it back.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Charge {
    /// Returns true if this charge already carries metadata of its own.
    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }
}

/// A refund - a post-charge adjustment referencing a charge.
///
/// Refunds carry no metadata of their own; it is resolved by following
/// the charge -> payment-intent relation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Refund {
    /// Refund identifier (re_...).
    pub id: String,

    /// Identifier of the refunded charge.
    #[serde(default)]
    pub charge: Option<String>,

    /// Refunded amount in currency minor units.
    #[serde(default)]
    pub amount: i64,

    /// Lowercase currency code.
    #[serde(default)]
    pub currency: String,

    /// Refund status (e.g. "succeeded", "pending").
    #[serde(default)]
    pub status: Option<String>,

    /// Reason supplied when the refund was issued.
    #[serde(default)]
    pub reason: Option<String>,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: i64,
}

/// A dispute - a chargeback record referencing a charge.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Dispute {
    /// Dispute identifier (dp_...).
    pub id: String,

    /// Identifier of the disputed charge.
    #[serde(default)]
    pub charge: Option<String>,

    /// Disputed amount in currency minor units.
    #[serde(default)]
    pub amount: i64,

    /// Lowercase currency code.
    #[serde(default)]
    pub currency: String,

    /// Dispute status (e.g. "needs_response").
    #[serde(default)]
    pub status: String,
}

/// A hosted checkout session tied to one purchase attempt.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Session identifier (cs_...).
    pub id: String,

    /// URL of the hosted payment page, present while the session is open.
    #[serde(default)]
    pub url: Option<String>,

    /// Identifier of the payment intent backing this session.
    #[serde(default)]
    pub payment_intent: Option<String>,

    /// Session payment status ("paid", "unpaid", "no_payment_required").
    #[serde(default)]
    pub payment_status: String,

    /// Total amount in currency minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,

    /// Lowercase currency code.
    #[serde(default)]
    pub currency: Option<String>,

    /// Email collected during checkout.
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Application metadata attached at session creation.
    #[serde(default)]
    pub metadata: Metadata,
}
