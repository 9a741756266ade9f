//! IssueRefundHandler - Command handler for refunding a checkout session.

use std::sync::Arc;

use tracing::info;

use crate::domain::payment::{PaymentsError, Refund};
use crate::ports::{CreateRefundRequest, PaymentGateway};

/// Command to refund the charge behind a checkout session.
#[derive(Debug, Clone)]
pub struct IssueRefundCommand {
    pub session_id: String,

    /// Refund amount in major units (e.g. 12.50). `None` refunds in full.
    pub amount: Option<f64>,

    /// Optional provider reason code.
    pub reason: Option<String>,
}

/// Result of a successful refund.
#[derive(Debug, Clone)]
pub struct IssueRefundResult {
    pub refund: Refund,
}

/// Handler for issuing refunds.
///
/// Walks session -> payment intent -> latest charge and refunds that
/// charge. The caller addresses payments by session ID; charge IDs never
/// leave the service.
pub struct IssueRefundHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl IssueRefundHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(&self, cmd: IssueRefundCommand) -> Result<IssueRefundResult, PaymentsError> {
        if cmd.session_id.trim().is_empty() {
            return Err(PaymentsError::validation("sessionId", "must not be empty"));
        }

        let amount_minor = match cmd.amount {
            Some(amount) => Some(to_minor_units(amount)?),
            None => None,
        };

        let session = self.gateway.retrieve_checkout_session(&cmd.session_id).await?;

        let intent_id = session.payment_intent.ok_or_else(|| {
            PaymentsError::validation("sessionId", "no payment found for this session")
        })?;

        let charges = self.gateway.list_charges(&intent_id, 1).await?;
        let charge = charges.into_iter().next().ok_or_else(|| {
            PaymentsError::validation("sessionId", "no charge found for this session")
        })?;

        let refund = self
            .gateway
            .create_refund(CreateRefundRequest {
                charge_id: charge.id.clone(),
                amount_minor,
                reason: cmd.reason,
            })
            .await?;

        info!(
            session_id = %cmd.session_id,
            charge_id = %charge.id,
            refund_id = %refund.id,
            amount_minor = refund.amount,
            "refund issued"
        );

        Ok(IssueRefundResult { refund })
    }
}

/// Converts a major-unit amount to minor units, rejecting non-positive or
/// non-finite values. 12.50 becomes 1250.
fn to_minor_units(amount: f64) -> Result<i64, PaymentsError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentsError::validation(
            "amount",
            "must be a positive number",
        ));
    }
    Ok((amount * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockGateway;
    use crate::domain::payment::{Charge, CheckoutSession, Metadata};

    fn paid_session(gateway: &MockGateway) {
        gateway.add_session(CheckoutSession {
            id: "cs_1".to_string(),
            url: None,
            payment_intent: Some("pi_1".to_string()),
            payment_status: "paid".to_string(),
            amount_total: Some(7900),
            currency: Some("usd".to_string()),
            customer_email: None,
            metadata: Metadata::new(),
        });
        gateway.add_charge(Charge {
            id: "ch_1".to_string(),
            payment_intent: Some("pi_1".to_string()),
            amount: 7900,
            currency: "usd".to_string(),
            status: "succeeded".to_string(),
            metadata: Metadata::new(),
        });
    }

    #[tokio::test]
    async fn refunds_latest_charge_for_session() {
        let gateway = Arc::new(MockGateway::new());
        paid_session(&gateway);

        let result = IssueRefundHandler::new(gateway.clone())
            .handle(IssueRefundCommand {
                session_id: "cs_1".to_string(),
                amount: Some(12.50),
                reason: None,
            })
            .await
            .unwrap();

        assert_eq!(result.refund.amount, 1250);
        assert_eq!(result.refund.charge.as_deref(), Some("ch_1"));
    }

    #[tokio::test]
    async fn omitted_amount_refunds_in_full() {
        let gateway = Arc::new(MockGateway::new());
        paid_session(&gateway);

        let result = IssueRefundHandler::new(gateway)
            .handle(IssueRefundCommand {
                session_id: "cs_1".to_string(),
                amount: None,
                reason: Some("requested_by_customer".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.refund.amount, 7900);
        assert_eq!(
            result.refund.reason.as_deref(),
            Some("requested_by_customer")
        );
    }

    #[tokio::test]
    async fn session_without_payment_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        gateway.add_session(CheckoutSession {
            id: "cs_unpaid".to_string(),
            url: None,
            payment_intent: None,
            payment_status: "unpaid".to_string(),
            amount_total: None,
            currency: None,
            customer_email: None,
            metadata: Metadata::new(),
        });

        let result = IssueRefundHandler::new(gateway)
            .handle(IssueRefundCommand {
                session_id: "cs_unpaid".to_string(),
                amount: None,
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(PaymentsError::Validation { .. })));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let gateway = Arc::new(MockGateway::new());

        let result = IssueRefundHandler::new(gateway)
            .handle(IssueRefundCommand {
                session_id: "cs_missing".to_string(),
                amount: None,
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(PaymentsError::NotFound(_))));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        paid_session(&gateway);

        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = IssueRefundHandler::new(gateway.clone())
                .handle(IssueRefundCommand {
                    session_id: "cs_1".to_string(),
                    amount: Some(bad),
                    reason: None,
                })
                .await;

            assert!(
                matches!(result, Err(PaymentsError::Validation { .. })),
                "expected rejection for {}",
                bad
            );
        }
    }

    #[test]
    fn minor_unit_conversion_rounds_to_cents() {
        assert_eq!(to_minor_units(12.50).unwrap(), 1250);
        assert_eq!(to_minor_units(0.01).unwrap(), 1);
        assert_eq!(to_minor_units(79.0).unwrap(), 7900);
        assert_eq!(to_minor_units(0.999).unwrap(), 100);
    }

    proptest::proptest! {
        #[test]
        fn minor_unit_conversion_round_trips_cents(cents in 1i64..=10_000_000) {
            let major = cents as f64 / 100.0;
            proptest::prop_assert_eq!(to_minor_units(major).unwrap(), cents);
        }
    }
}
