//! In-memory payment gateway for tests and local development.
//!
//! Behaves like a tiny Stripe: objects are linked by ID, lookups miss with
//! `NotFound`, and every metadata write is recorded so tests can assert on
//! write counts.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::payment::{Charge, CheckoutSession, Metadata, PaymentIntent, Refund};
use crate::ports::{
    ChargeStore, CreateCheckoutSessionRequest, CreateRefundRequest, GatewayError, PaymentGateway,
};

/// In-memory `PaymentGateway` implementation.
#[derive(Default)]
pub struct MockGateway {
    sessions: Mutex<Vec<CheckoutSession>>,
    intents: Mutex<Vec<PaymentIntent>>,
    charges: Mutex<Vec<Charge>>,
    refunds: Mutex<Vec<Refund>>,
    metadata_writes: Mutex<Vec<(String, Metadata)>>,
    next_id: AtomicU64,
    fail_all: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a network error.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    pub fn add_session(&self, session: CheckoutSession) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn add_intent(&self, intent: PaymentIntent) {
        self.intents.lock().unwrap().push(intent);
    }

    pub fn add_charge(&self, charge: Charge) {
        self.charges.lock().unwrap().push(charge);
    }

    pub fn add_refund(&self, refund: Refund) {
        self.refunds.lock().unwrap().push(refund);
    }

    /// Recorded `(charge_id, metadata)` writes, oldest first.
    pub fn metadata_writes(&self) -> Vec<(String, Metadata)> {
        self.metadata_writes.lock().unwrap().clone()
    }

    /// Refunds created through `create_refund`.
    pub fn refunds(&self) -> Vec<Refund> {
        self.refunds.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(GatewayError::network("mock gateway offline"))
        } else {
            Ok(())
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("{}_mock_{}", prefix, n)
    }
}

#[async_trait]
impl ChargeStore for MockGateway {
    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        self.check_failure()?;
        self.intents
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("payment intent"))
    }

    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, GatewayError> {
        self.check_failure()?;
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
        self.check_failure()?;
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
        self.check_failure()?;
        self.metadata_writes
            .lock()
            .unwrap()
            .push((charge_id.to_string(), metadata.clone()));

        let mut charges = self.charges.lock().unwrap();
        let charge = charges
            .iter_mut()
            .find(|c| c.id == charge_id)
            .ok_or_else(|| GatewayError::not_found("charge"))?;
        charge.metadata = metadata.clone();
        Ok(charge.clone())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        self.check_failure()?;
        let id = self.next_id("cs");
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://checkout.example.com/pay/{}", id)),
            payment_intent: None,
            payment_status: "unpaid".to_string(),
            amount_total: Some(7900),
            currency: Some("usd".to_string()),
            customer_email: None,
            metadata: request.metadata,
        };
        self.sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        self.check_failure()?;
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or_else(|| GatewayError::not_found("checkout session"))
    }

    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, GatewayError> {
        self.check_failure()?;

        let charge = self.retrieve_charge(&request.charge_id).await?;
        let refund = Refund {
            id: self.next_id("re"),
            charge: Some(charge.id),
            amount: request.amount_minor.unwrap_or(charge.amount),
            currency: charge.currency,
            status: Some("succeeded".to_string()),
            reason: request.reason,
            created: chrono::Utc::now().timestamp(),
        };
        self.refunds.lock().unwrap().push(refund.clone());
        Ok(refund)
    }

    async fn list_refunds(&self, charge_id: &str) -> Result<Vec<Refund>, GatewayError> {
        self.check_failure()?;
        Ok(self
            .refunds
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.charge.as_deref() == Some(charge_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checkout_session_carries_request_metadata() {
        let gateway = MockGateway::new();
        let request = CreateCheckoutSessionRequest {
            price_id: None,
            metadata: [("UserId", "user_1")].into_iter().collect(),
            locale: "en".to_string(),
            success_url: "https://app.example.com/success".to_string(),
            cancel_url: "https://app.example.com/cancel".to_string(),
        };

        let session = gateway.create_checkout_session(request).await.unwrap();

        assert!(session.url.is_some());
        assert_eq!(session.metadata.user_id(), Some("user_1"));
    }

    #[tokio::test]
    async fn refund_defaults_to_full_charge_amount() {
        let gateway = MockGateway::new();
        gateway.add_charge(Charge {
            id: "ch_1".to_string(),
            payment_intent: Some("pi_1".to_string()),
            amount: 7900,
            currency: "usd".to_string(),
            status: "succeeded".to_string(),
            metadata: Metadata::new(),
        });

        let refund = gateway
            .create_refund(CreateRefundRequest {
                charge_id: "ch_1".to_string(),
                amount_minor: None,
                reason: None,
            })
            .await
            .unwrap();

        assert_eq!(refund.amount, 7900);
        assert_eq!(gateway.refunds().len(), 1);
    }

    #[tokio::test]
    async fn missing_objects_are_not_found() {
        let gateway = MockGateway::new();

        let result = gateway.retrieve_charge("ch_missing").await;

        assert!(result.is_err());
    }
}
