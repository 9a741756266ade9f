//! ProcessWebhookHandler - Verifies and dispatches incoming webhook events.

use std::sync::Arc;

use crate::domain::payment::{EventPipeline, PipelineOutcome, WebhookError, WebhookVerifier};

/// Handler for the webhook endpoint.
///
/// Authentication and processing are intentionally split: verification
/// failures are the caller's problem (400, provider retries), while
/// anything after verification is ours and never fails the delivery.
pub struct ProcessWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    pipeline: EventPipeline,
    require_livemode: bool,
}

impl ProcessWebhookHandler {
    pub fn new(verifier: Arc<WebhookVerifier>, pipeline: EventPipeline) -> Self {
        Self {
            verifier,
            pipeline,
            require_livemode: false,
        }
    }

    /// Reject test-mode events. Enabled in production deployments.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    /// Verifies the signature over the raw body, then processes the event.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PipelineOutcome, WebhookError> {
        let event = self.verifier.verify_and_parse(payload, signature_header)?;

        if self.require_livemode && !event.is_live() {
            return Err(WebhookError::LivemodeMismatch);
        }

        Ok(self.pipeline.process(&event).await)
    }
}
