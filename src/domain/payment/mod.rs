//! Payment domain - metadata propagation across provider objects.
//!
//! The payment provider is the system of record; this module holds the
//! logic that rides on top of it:
//!
//! - `Metadata` - the key/value record carried through the payment lifecycle
//! - provider object snapshots (`PaymentIntent`, `Charge`, `Refund`, ...)
//! - `StripeEvent` - the signed webhook envelope and event classification
//! - `WebhookVerifier` - HMAC-SHA256 signature verification
//! - `MetadataResolver` - charge -> intent metadata resolution with write-back
//! - `EventPipeline` - per-event-type dispatch over authenticated events

mod errors;
mod metadata;
mod objects;
mod pipeline;
mod resolver;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use errors::PaymentsError;
pub use metadata::{Metadata, KEY_CREDIT_GRANTED, KEY_USER_ID};
pub use objects::{Charge, CheckoutSession, Dispute, PaymentIntent, Refund};
pub use pipeline::{EventPipeline, PipelineOutcome};
pub use resolver::{MetadataResolver, MetadataSource, ResolvedMetadata};
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, WebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
