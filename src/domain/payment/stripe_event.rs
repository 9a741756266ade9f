//! Webhook event envelope and classification.
//!
//! Defines the structure of the provider's signed event notifications.
//! Only the fields this service reads are captured; the rest of the
//! provider's event schema is ignored.

use serde::{Deserialize, Serialize};

/// Webhook event envelope as delivered by the provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_... format).
    pub id: String,

    /// Type of event (e.g. "charge.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Container for the object that triggered the event.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (shape depends on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only on update events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl StripeEvent {
    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    /// Classify the event type string into a known variant.
    pub fn classified(&self) -> StripeEventType {
        StripeEventType::from_type_str(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Event types the ingestion pipeline dispatches on.
///
/// The provider may add new event types at any time; anything not listed
/// here classifies as `Unknown` and is acknowledged without action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    /// Checkout session completed successfully.
    CheckoutSessionCompleted,
    /// Checkout session expired without payment.
    CheckoutSessionExpired,
    /// Delayed payment method settled after checkout.
    CheckoutAsyncPaymentSucceeded,
    /// Delayed payment method failed after checkout.
    CheckoutAsyncPaymentFailed,
    /// Payment intent was created.
    PaymentIntentCreated,
    /// Payment intent reached its succeeded terminal state.
    PaymentIntentSucceeded,
    /// Payment intent reached its failed terminal state.
    PaymentIntentFailed,
    /// A charge settled successfully.
    ChargeSucceeded,
    /// A charge was refunded (fully or partially).
    ChargeRefunded,
    /// A refund record was created.
    RefundCreated,
    /// A dispute was opened against a charge.
    DisputeCreated,
    /// Unknown or unhandled event type.
    Unknown,
}

impl StripeEventType {
    /// Parse an event type from the provider's type string.
    pub fn from_type_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            "checkout.session.async_payment_succeeded" => Self::CheckoutAsyncPaymentSucceeded,
            "checkout.session.async_payment_failed" => Self::CheckoutAsyncPaymentFailed,
            "payment_intent.created" => Self::PaymentIntentCreated,
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            "charge.succeeded" => Self::ChargeSucceeded,
            "charge.refunded" => Self::ChargeRefunded,
            "refund.created" => Self::RefundCreated,
            "charge.dispute.created" => Self::DisputeCreated,
            _ => Self::Unknown,
        }
    }

    /// The provider's event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CheckoutSessionExpired => "checkout.session.expired",
            Self::CheckoutAsyncPaymentSucceeded => "checkout.session.async_payment_succeeded",
            Self::CheckoutAsyncPaymentFailed => "checkout.session.async_payment_failed",
            Self::PaymentIntentCreated => "payment_intent.created",
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::PaymentIntentFailed => "payment_intent.payment_failed",
            Self::ChargeSucceeded => "charge.succeeded",
            Self::ChargeRefunded => "charge.refunded",
            Self::RefundCreated => "refund.created",
            Self::DisputeCreated => "charge.dispute.created",
            Self::Unknown => "unknown",
        }
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "charge.succeeded".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2025-02-24.acacia".to_string()),
        }
    }
}
