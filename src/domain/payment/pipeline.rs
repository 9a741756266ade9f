//! Webhook event pipeline.
//!
//! Dispatches authenticated provider events to per-type handling. Every
//! event reaching this point has already passed signature verification, so
//! nothing here may turn into a response error: the provider retries on
//! non-2xx, and retrying a delivery we already understood only duplicates
//! work. Failures during resolution are logged and swallowed, and the
//! delivery is acknowledged regardless.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ports::ChargeStore;

use super::metadata::Metadata;
use super::objects::{Charge, CheckoutSession, Dispute, PaymentIntent, Refund};
use super::resolver::{MetadataResolver, MetadataSource};
use super::stripe_event::{StripeEvent, StripeEventType};

/// What the pipeline did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Metadata was resolved for the event's subject object.
    Resolved {
        source: MetadataSource,
        metadata: Metadata,
    },
    /// Event was acknowledged without side effects.
    NoOp,
}

/// Processes authenticated webhook events.
pub struct EventPipeline {
    store: Arc<dyn ChargeStore>,
}

impl EventPipeline {
    pub fn new(store: Arc<dyn ChargeStore>) -> Self {
        Self { store }
    }

    /// Processes a verified event.
    ///
    /// Infallible by design: resolution errors are logged with event
    /// context and collapse to `NoOp`, never to a caller-visible error.
    pub async fn process(&self, event: &StripeEvent) -> PipelineOutcome {
        let event_type = event.classified();
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "processing webhook event"
        );

        let result = match event_type {
            StripeEventType::CheckoutSessionCompleted
            | StripeEventType::CheckoutSessionExpired
            | StripeEventType::CheckoutAsyncPaymentSucceeded
            | StripeEventType::CheckoutAsyncPaymentFailed => {
                self.handle_checkout_session(event).await
            }
            StripeEventType::PaymentIntentCreated => self.handle_intent_created(event).await,
            StripeEventType::PaymentIntentSucceeded | StripeEventType::PaymentIntentFailed => {
                self.handle_intent(event).await
            }
            StripeEventType::ChargeSucceeded | StripeEventType::ChargeRefunded => {
                self.handle_charge(event).await
            }
            StripeEventType::RefundCreated => self.handle_refund(event).await,
            StripeEventType::DisputeCreated => self.handle_dispute(event).await,
            StripeEventType::Unknown => {
                info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "ignoring unhandled event type"
                );
                return PipelineOutcome::NoOp;
            }
        };

        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %err,
                    "event handling failed, acknowledging anyway"
                );
                PipelineOutcome::NoOp
            }
        }
    }

    /// Checkout session events carry their metadata directly.
    async fn handle_checkout_session(
        &self,
        event: &StripeEvent,
    ) -> Result<PipelineOutcome, PipelineError> {
        let session: CheckoutSession = event.deserialize_object().map_err(PipelineError::parse)?;

        info!(
            event_id = %event.id,
            session_id = %session.id,
            payment_status = %session.payment_status,
            user_id = session.metadata.user_id().unwrap_or(""),
            credit_granted = session.metadata.credit_granted().unwrap_or(""),
            "checkout session event"
        );

        let source = if session.metadata.is_empty() {
            MetadataSource::Absent
        } else {
            MetadataSource::Own
        };
        Ok(PipelineOutcome::Resolved {
            source,
            metadata: session.metadata,
        })
    }

    /// On intent creation the charge usually does not exist yet; when it
    /// already does and arrived without metadata, backfill it now so charge
    /// events that race this one find it populated.
    async fn handle_intent_created(
        &self,
        event: &StripeEvent,
    ) -> Result<PipelineOutcome, PipelineError> {
        let intent: PaymentIntent = event.deserialize_object().map_err(PipelineError::parse)?;

        info!(
            event_id = %event.id,
            payment_intent_id = %intent.id,
            user_id = intent.metadata.user_id().unwrap_or(""),
            credit_granted = intent.metadata.credit_granted().unwrap_or(""),
            "payment intent created"
        );

        if !intent.metadata.is_empty() {
            let charges = self
                .store
                .list_charges(&intent.id, 1)
                .await
                .map_err(PipelineError::gateway)?;
            if let Some(charge) = charges.first() {
                if !charge.has_metadata() {
                    self.store
                        .update_charge_metadata(&charge.id, &intent.metadata)
                        .await
                        .map_err(PipelineError::gateway)?;
                    info!(
                        charge_id = %charge.id,
                        payment_intent_id = %intent.id,
                        "backfilled existing charge from new payment intent"
                    );
                }
            }
        }

        let source = if intent.metadata.is_empty() {
            MetadataSource::Absent
        } else {
            MetadataSource::Own
        };
        Ok(PipelineOutcome::Resolved {
            source,
            metadata: intent.metadata,
        })
    }

    async fn handle_intent(&self, event: &StripeEvent) -> Result<PipelineOutcome, PipelineError> {
        let intent: PaymentIntent = event.deserialize_object().map_err(PipelineError::parse)?;

        info!(
            event_id = %event.id,
            payment_intent_id = %intent.id,
            status = %intent.status,
            user_id = intent.metadata.user_id().unwrap_or(""),
            credit_granted = intent.metadata.credit_granted().unwrap_or(""),
            "payment intent event"
        );

        let source = if intent.metadata.is_empty() {
            MetadataSource::Absent
        } else {
            MetadataSource::Own
        };
        Ok(PipelineOutcome::Resolved {
            source,
            metadata: intent.metadata,
        })
    }

    async fn handle_charge(&self, event: &StripeEvent) -> Result<PipelineOutcome, PipelineError> {
        let charge: Charge = event.deserialize_object().map_err(PipelineError::parse)?;

        let resolved = MetadataResolver::new(self.store.as_ref())
            .resolve_for_charge(&charge)
            .await
            .map_err(PipelineError::gateway)?;

        info!(
            event_id = %event.id,
            charge_id = %charge.id,
            source = ?resolved.source,
            user_id = resolved.metadata.user_id().unwrap_or(""),
            credit_granted = resolved.metadata.credit_granted().unwrap_or(""),
            "charge event"
        );

        Ok(PipelineOutcome::Resolved {
            source: resolved.source,
            metadata: resolved.metadata,
        })
    }

    async fn handle_refund(&self, event: &StripeEvent) -> Result<PipelineOutcome, PipelineError> {
        let refund: Refund = event.deserialize_object().map_err(PipelineError::parse)?;

        let resolved = match refund.charge.as_deref() {
            Some(charge_id) => MetadataResolver::new(self.store.as_ref())
                .resolve_for_charge_id(charge_id)
                .await
                .map_err(PipelineError::gateway)?,
            None => {
                warn!(event_id = %event.id, refund_id = %refund.id, "refund has no charge link");
                return Ok(PipelineOutcome::Resolved {
                    source: MetadataSource::Absent,
                    metadata: Metadata::new(),
                });
            }
        };

        info!(
            event_id = %event.id,
            refund_id = %refund.id,
            source = ?resolved.source,
            user_id = resolved.metadata.user_id().unwrap_or(""),
            credit_granted = resolved.metadata.credit_granted().unwrap_or(""),
            "refund created"
        );

        Ok(PipelineOutcome::Resolved {
            source: resolved.source,
            metadata: resolved.metadata,
        })
    }

    async fn handle_dispute(&self, event: &StripeEvent) -> Result<PipelineOutcome, PipelineError> {
        let dispute: Dispute = event.deserialize_object().map_err(PipelineError::parse)?;

        let resolved = match dispute.charge.as_deref() {
            Some(charge_id) => MetadataResolver::new(self.store.as_ref())
                .resolve_for_charge_id(charge_id)
                .await
                .map_err(PipelineError::gateway)?,
            None => {
                warn!(event_id = %event.id, dispute_id = %dispute.id, "dispute has no charge link");
                return Ok(PipelineOutcome::Resolved {
                    source: MetadataSource::Absent,
                    metadata: Metadata::new(),
                });
            }
        };

        info!(
            event_id = %event.id,
            dispute_id = %dispute.id,
            status = %dispute.status,
            source = ?resolved.source,
            user_id = resolved.metadata.user_id().unwrap_or(""),
            credit_granted = resolved.metadata.credit_granted().unwrap_or(""),
            "dispute created"
        );

        Ok(PipelineOutcome::Resolved {
            source: resolved.source,
            metadata: resolved.metadata,
        })
    }
}

/// Internal failure during event handling. Never escapes `process`.
#[derive(Debug)]
struct PipelineError(String);

impl PipelineError {
    fn parse(err: serde_json::Error) -> Self {
        Self(format!("malformed event object: {}", err))
    }

    fn gateway(err: crate::ports::GatewayError) -> Self {
        Self(err.to_string())
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::domain::payment::stripe_event::StripeEventBuilder;
    use crate::ports::GatewayError;

    // ══════════════════════════════════════════════════════════════
    // Test Store
    // ══════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct RecordingStore {
        intents: Mutex<Vec<PaymentIntent>>,
        charges: Mutex<Vec<Charge>>,
        writes: Mutex<Vec<String>>,
        fail_all: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                fail_all: true,
                ..Default::default()
            }
        }

        fn with_intent(self, id: &str, metadata: Metadata) -> Self {
            self.intents.lock().unwrap().push(PaymentIntent {
                id: id.to_string(),
                status: "succeeded".to_string(),
                amount: 7900,
                currency: "usd".to_string(),
                metadata,
            });
            self
        }

        fn with_charge(self, id: &str, intent_id: &str, metadata: Metadata) -> Self {
            self.charges.lock().unwrap().push(Charge {
                id: id.to_string(),
                payment_intent: Some(intent_id.to_string()),
                amount: 7900,
                currency: "usd".to_string(),
                status: "succeeded".to_string(),
                metadata,
            });
            self
        }

        fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        fn fail_check(&self) -> Result<(), GatewayError> {
            if self.fail_all {
                Err(GatewayError::network("connection refused"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ChargeStore for RecordingStore {
        async fn retrieve_payment_intent(
            &self,
            intent_id: &str,
        ) -> Result<PaymentIntent, GatewayError> {
            self.fail_check()?;
            self.intents
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.id == intent_id)
                .cloned()
                .ok_or_else(|| GatewayError::not_found("payment intent"))
        }

        async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, GatewayError> {
            self.fail_check()?;
            self.charges
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == charge_id)
                .cloned()
                .ok_or_else(|| GatewayError::not_found("charge"))
        }

        async fn list_charges(
            &self,
            payment_intent_id: &str,
            limit: u8,
        ) -> Result<Vec<Charge>, GatewayError> {
            self.fail_check()?;
            Ok(self
                .charges
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.payment_intent.as_deref() == Some(payment_intent_id))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn update_charge_metadata(
            &self,
            charge_id: &str,
            metadata: &Metadata,
        ) -> Result<Charge, GatewayError> {
            self.fail_check()?;
            self.writes.lock().unwrap().push(charge_id.to_string());

            let mut charges = self.charges.lock().unwrap();
            let charge = charges
                .iter_mut()
                .find(|c| c.id == charge_id)
                .ok_or_else(|| GatewayError::not_found("charge"))?;
            charge.metadata = metadata.clone();
            Ok(charge.clone())
        }
    }

    fn pipeline(store: RecordingStore) -> (EventPipeline, Arc<RecordingStore>) {
        let store = Arc::new(store);
        (EventPipeline::new(store.clone()), store)
    }

    fn checkout_metadata() -> Metadata {
        [("UserId", "user_42"), ("CreditGranted", "5")]
            .into_iter()
            .collect()
    }

    // ══════════════════════════════════════════════════════════════
    // Dispatch Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_event_type_is_noop() {
        let (pipeline, store) = pipeline(RecordingStore::default());
        let event = StripeEventBuilder::new()
            .event_type("invoice.payment_succeeded")
            .object(json!({"id": "in_123"}))
            .build();

        let outcome = pipeline.process(&event).await;

        assert_eq!(outcome, PipelineOutcome::NoOp);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn checkout_session_completed_reads_own_metadata() {
        let (pipeline, store) = pipeline(RecordingStore::default());
        let event = StripeEventBuilder::new()
            .event_type("checkout.session.completed")
            .object(json!({
                "id": "cs_123",
                "payment_status": "paid",
                "metadata": {"UserId": "user_42", "CreditGranted": "5"}
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        match outcome {
            PipelineOutcome::Resolved { source, metadata } => {
                assert_eq!(source, MetadataSource::Own);
                assert_eq!(metadata.user_id(), Some("user_42"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn charge_succeeded_backfills_empty_charge() {
        let store = RecordingStore::default()
            .with_intent("pi_1", checkout_metadata())
            .with_charge("ch_1", "pi_1", Metadata::new());
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("charge.succeeded")
            .object(json!({
                "id": "ch_1",
                "payment_intent": "pi_1",
                "metadata": {}
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        match outcome {
            PipelineOutcome::Resolved { source, metadata } => {
                assert_eq!(source, MetadataSource::PaymentIntent);
                assert_eq!(metadata.credit_granted(), Some("5"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn charge_succeeded_double_delivery_writes_once() {
        let store = RecordingStore::default()
            .with_intent("pi_1", checkout_metadata())
            .with_charge("ch_1", "pi_1", Metadata::new());
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("charge.succeeded")
            .object(json!({
                "id": "ch_1",
                "payment_intent": "pi_1",
                "metadata": {}
            }))
            .build();

        pipeline.process(&event).await;
        pipeline.process(&event).await;

        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn charge_refunded_resolves_like_charge_succeeded() {
        let store = RecordingStore::default()
            .with_intent("pi_1", checkout_metadata())
            .with_charge("ch_1", "pi_1", Metadata::new());
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(json!({
                "id": "ch_1",
                "payment_intent": "pi_1",
                "metadata": {}
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Resolved {
                source: MetadataSource::PaymentIntent,
                ..
            }
        ));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn payment_intent_created_backfills_existing_empty_charge() {
        let store = RecordingStore::default()
            .with_intent("pi_1", checkout_metadata())
            .with_charge("ch_1", "pi_1", Metadata::new());
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("payment_intent.created")
            .object(json!({
                "id": "pi_1",
                "status": "processing",
                "metadata": {"UserId": "user_42", "CreditGranted": "5"}
            }))
            .build();

        pipeline.process(&event).await;

        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn payment_intent_created_without_charges_makes_no_writes() {
        let store = RecordingStore::default().with_intent("pi_1", checkout_metadata());
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("payment_intent.created")
            .object(json!({
                "id": "pi_1",
                "status": "processing",
                "metadata": {"UserId": "user_42", "CreditGranted": "5"}
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        assert!(matches!(outcome, PipelineOutcome::Resolved { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn payment_intent_created_keeps_populated_charge() {
        let other: Metadata = [("UserId", "someone_else")].into_iter().collect();
        let store = RecordingStore::default()
            .with_intent("pi_1", checkout_metadata())
            .with_charge("ch_1", "pi_1", other);
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("payment_intent.created")
            .object(json!({
                "id": "pi_1",
                "status": "processing",
                "metadata": {"UserId": "user_42", "CreditGranted": "5"}
            }))
            .build();

        pipeline.process(&event).await;

        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn refund_created_resolves_two_hops_without_write() {
        let store = RecordingStore::default()
            .with_intent("pi_1", checkout_metadata())
            .with_charge("ch_1", "pi_1", Metadata::new());
        let (pipeline, store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("refund.created")
            .object(json!({
                "id": "re_1",
                "charge": "ch_1",
                "amount": 1250
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        match outcome {
            PipelineOutcome::Resolved { source, metadata } => {
                assert_eq!(source, MetadataSource::PaymentIntent);
                assert_eq!(metadata.user_id(), Some("user_42"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn dispute_created_resolves_via_charge() {
        let store = RecordingStore::default()
            .with_charge("ch_1", "pi_1", checkout_metadata());
        let (pipeline, _store) = pipeline(store);
        let event = StripeEventBuilder::new()
            .event_type("charge.dispute.created")
            .object(json!({
                "id": "dp_1",
                "charge": "ch_1",
                "status": "needs_response"
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Resolved {
                source: MetadataSource::Own,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn refund_without_charge_link_resolves_absent() {
        let (pipeline, _store) = pipeline(RecordingStore::default());
        let event = StripeEventBuilder::new()
            .event_type("refund.created")
            .object(json!({"id": "re_1", "amount": 500}))
            .build();

        let outcome = pipeline.process(&event).await;

        assert!(matches!(
            outcome,
            PipelineOutcome::Resolved {
                source: MetadataSource::Absent,
                ..
            }
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Failure Swallowing Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn store_failure_collapses_to_noop() {
        let (pipeline, _store) = pipeline(RecordingStore::failing());
        let event = StripeEventBuilder::new()
            .event_type("charge.succeeded")
            .object(json!({
                "id": "ch_1",
                "payment_intent": "pi_1",
                "metadata": {}
            }))
            .build();

        let outcome = pipeline.process(&event).await;

        assert_eq!(outcome, PipelineOutcome::NoOp);
    }

    #[tokio::test]
    async fn malformed_object_collapses_to_noop() {
        let (pipeline, store) = pipeline(RecordingStore::default());
        // Charge object missing its required id
        let event = StripeEventBuilder::new()
            .event_type("charge.succeeded")
            .object(json!({"amount": "not a number"}))
            .build();

        let outcome = pipeline.process(&event).await;

        assert_eq!(outcome, PipelineOutcome::NoOp);
        assert_eq!(store.write_count(), 0);
    }
}
