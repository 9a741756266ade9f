//! VerifySessionHandler - Query handler for checkout session state.

use std::sync::Arc;

use crate::domain::payment::{CheckoutSession, PaymentsError};
use crate::ports::PaymentGateway;

/// Query for a checkout session's payment state.
#[derive(Debug, Clone)]
pub struct VerifySessionCommand {
    pub session_id: String,
}

/// Handler for verifying a checkout session after redirect.
///
/// Frontends call this with the session ID from the success URL. The
/// session is fetched fresh from the provider so the answer reflects the
/// actual payment state, not the redirect alone.
pub struct VerifySessionHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl VerifySessionHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, cmd: VerifySessionCommand) -> Result<CheckoutSession, PaymentsError> {
        if cmd.session_id.trim().is_empty() {
            return Err(PaymentsError::validation("session_id", "must not be empty"));
        }

        let session = self.gateway.retrieve_checkout_session(&cmd.session_id).await?;
        Ok(session)
    }
}
