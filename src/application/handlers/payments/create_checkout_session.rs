//! CreateCheckoutSessionHandler - Command handler for starting a checkout.

use std::sync::Arc;

use tracing::info;

use crate::domain::payment::{Metadata, PaymentsError, KEY_CREDIT_GRANTED, KEY_USER_ID};
use crate::ports::{CreateCheckoutSessionRequest, PaymentGateway};

const KEY_PRODUCT: &str = "product";
const PRODUCT_LABEL: &str = "GlowUp Premium";
const MAX_METADATA_VALUE_LEN: usize = 128;

/// Command to create a hosted checkout session.
#[derive(Debug, Clone, Default)]
pub struct CreateCheckoutSessionCommand {
    /// Price to charge; overrides the configured default when given.
    pub price_id: Option<String>,

    /// Caller's user identifier, propagated as metadata when given.
    pub user_id: Option<String>,

    /// Credits to grant on successful payment, as a base-10 integer string.
    pub credit_granted: Option<String>,

    /// Checkout page locale; defaults to "en".
    pub locale: Option<String>,
}

/// Result of a created checkout session.
#[derive(Debug, Clone)]
pub struct CreateCheckoutSessionResult {
    pub session_id: String,
    pub url: String,
}

/// Handler for creating checkout sessions.
///
/// Stamps the caller's metadata on both the session and its future payment
/// intent so the webhook pipeline can recover it from either side.
pub struct CreateCheckoutSessionHandler {
    gateway: Arc<dyn PaymentGateway>,
    public_domain: String,
    price_id: Option<String>,
}

impl CreateCheckoutSessionHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        public_domain: impl Into<String>,
        price_id: Option<String>,
    ) -> Self {
        Self {
            gateway,
            public_domain: public_domain.into(),
            price_id,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutSessionCommand,
    ) -> Result<CreateCheckoutSessionResult, PaymentsError> {
        let mut metadata = Metadata::new();
        if let Some(user_id) = &cmd.user_id {
            validate_user_id(user_id)?;
            metadata.insert(KEY_USER_ID, user_id.clone());
        }
        if let Some(credit_granted) = &cmd.credit_granted {
            validate_credit_granted(credit_granted)?;
            metadata.insert(KEY_CREDIT_GRANTED, credit_granted.clone());
        }
        metadata.insert(KEY_PRODUCT, PRODUCT_LABEL);

        let session = self
            .gateway
            .create_checkout_session(CreateCheckoutSessionRequest {
                price_id: cmd.price_id.clone().or_else(|| self.price_id.clone()),
                metadata,
                locale: cmd.locale.unwrap_or_else(|| "en".to_string()),
                success_url: format!(
                    "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
                    self.public_domain
                ),
                cancel_url: format!("{}/payment-cancelled", self.public_domain),
            })
            .await?;

        let url = session.url.ok_or_else(|| PaymentsError::Remote {
            message: "checkout session has no redirect url".to_string(),
            retryable: false,
        })?;

        info!(
            session_id = %session.id,
            user_id = cmd.user_id.as_deref().unwrap_or("-"),
            "checkout session created"
        );

        Ok(CreateCheckoutSessionResult {
            session_id: session.id,
            url,
        })
    }
}

/// Untrusted caller input: bounded length, no control characters.
fn validate_user_id(user_id: &str) -> Result<(), PaymentsError> {
    if user_id.trim().is_empty() {
        return Err(PaymentsError::validation("userId", "must not be empty"));
    }
    if user_id.len() > MAX_METADATA_VALUE_LEN {
        return Err(PaymentsError::validation(
            "userId",
            format!("must be at most {} characters", MAX_METADATA_VALUE_LEN),
        ));
    }
    if user_id.chars().any(|c| c.is_control()) {
        return Err(PaymentsError::validation(
            "userId",
            "must not contain control characters",
        ));
    }
    Ok(())
}

fn validate_credit_granted(credit_granted: &str) -> Result<(), PaymentsError> {
    if credit_granted.is_empty() || !credit_granted.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PaymentsError::validation(
            "creditGranted",
            "must be a base-10 integer",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockGateway;

    fn handler(gateway: Arc<MockGateway>) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(gateway, "https://app.example.com", None)
    }

    fn command() -> CreateCheckoutSessionCommand {
        CreateCheckoutSessionCommand {
            price_id: None,
            user_id: Some("user_42".to_string()),
            credit_granted: Some("5".to_string()),
            locale: None,
        }
    }

    #[tokio::test]
    async fn creates_session_with_propagated_metadata() {
        let gateway = Arc::new(MockGateway::new());
        let result = handler(gateway.clone()).handle(command()).await.unwrap();

        assert!(result.url.contains(&result.session_id));

        let session = gateway
            .retrieve_checkout_session(&result.session_id)
            .await
            .unwrap();
        assert_eq!(session.metadata.user_id(), Some("user_42"));
        assert_eq!(session.metadata.credit_granted(), Some("5"));
        assert_eq!(session.metadata.get("product"), Some("GlowUp Premium"));
    }

    #[tokio::test]
    async fn missing_metadata_still_creates_session() {
        let gateway = Arc::new(MockGateway::new());
        let result = handler(gateway.clone())
            .handle(CreateCheckoutSessionCommand::default())
            .await
            .unwrap();

        let session = gateway
            .retrieve_checkout_session(&result.session_id)
            .await
            .unwrap();
        assert!(session.metadata.user_id().is_none());
        assert_eq!(session.metadata.get("product"), Some("GlowUp Premium"));
    }

    #[tokio::test]
    async fn empty_user_id_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        let cmd = CreateCheckoutSessionCommand {
            user_id: Some("   ".to_string()),
            ..command()
        };

        let result = handler(gateway).handle(cmd).await;

        assert!(matches!(result, Err(PaymentsError::Validation { .. })));
    }

    #[tokio::test]
    async fn oversized_user_id_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        let cmd = CreateCheckoutSessionCommand {
            user_id: Some("u".repeat(129)),
            ..command()
        };

        let result = handler(gateway).handle(cmd).await;

        assert!(matches!(result, Err(PaymentsError::Validation { .. })));
    }

    #[tokio::test]
    async fn control_characters_in_user_id_are_rejected() {
        let gateway = Arc::new(MockGateway::new());
        let cmd = CreateCheckoutSessionCommand {
            user_id: Some("user\n42".to_string()),
            ..command()
        };

        let result = handler(gateway).handle(cmd).await;

        assert!(matches!(result, Err(PaymentsError::Validation { .. })));
    }

    #[tokio::test]
    async fn non_integer_credit_granted_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        for bad in ["", "five", "5.0", "-1"] {
            let cmd = CreateCheckoutSessionCommand {
                credit_granted: Some(bad.to_string()),
                ..command()
            };

            let result = handler(gateway.clone()).handle(cmd).await;

            assert!(
                matches!(result, Err(PaymentsError::Validation { .. })),
                "expected rejection for {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_remote_error() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_all();

        let result = handler(gateway).handle(command()).await;

        assert!(matches!(result, Err(PaymentsError::Remote { .. })));
    }
}
