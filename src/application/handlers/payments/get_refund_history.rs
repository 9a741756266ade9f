//! GetRefundHistoryHandler - Query handler for a session's refunds.

use std::sync::Arc;

use crate::domain::payment::{PaymentsError, Refund};
use crate::ports::PaymentGateway;

/// Charges to inspect per session. Sessions have one payment intent and
/// in practice one or two charges (retries).
const CHARGE_LOOKUP_LIMIT: u8 = 100;

/// Query for refunds issued against a checkout session.
#[derive(Debug, Clone)]
pub struct GetRefundHistoryCommand {
    pub session_id: String,
}

/// Refund history for a session.
#[derive(Debug, Clone)]
pub struct GetRefundHistoryResult {
    pub session_id: String,
    pub payment_status: String,
    pub refunds: Vec<Refund>,
}

/// Handler for listing a session's refunds.
///
/// Flattens refunds across every charge of the session's payment intent.
/// A session with no payment yet yields an empty list, not an error.
pub struct GetRefundHistoryHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl GetRefundHistoryHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(
        &self,
        cmd: GetRefundHistoryCommand,
    ) -> Result<GetRefundHistoryResult, PaymentsError> {
        if cmd.session_id.trim().is_empty() {
            return Err(PaymentsError::validation("sessionId", "must not be empty"));
        }

        let session = self.gateway.retrieve_checkout_session(&cmd.session_id).await?;

        let mut refunds = Vec::new();
        if let Some(intent_id) = session.payment_intent.as_deref() {
            let charges = self
                .gateway
                .list_charges(intent_id, CHARGE_LOOKUP_LIMIT)
                .await?;
            for charge in &charges {
                refunds.extend(self.gateway.list_refunds(&charge.id).await?);
            }
        }

        Ok(GetRefundHistoryResult {
            session_id: session.id,
            payment_status: session.payment_status,
            refunds,
        })
    }
}
