//! HTTP handlers for payments endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers. The webhook handler is the only one that reads the raw body;
//! signature verification requires the exact bytes from the wire.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::application::handlers::payments::{
    CreateCheckoutSessionCommand, CreateCheckoutSessionHandler, GetRefundHistoryCommand,
    GetRefundHistoryHandler, IssueRefundCommand, IssueRefundHandler, ProcessWebhookHandler,
    VerifySessionCommand, VerifySessionHandler,
};
use crate::domain::payment::{EventPipeline, PaymentsError, WebhookError, WebhookVerifier};
use crate::ports::{ChargeStore, PaymentGateway};

use super::dto::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, ErrorResponse, RefundHistoryResponse,
    RefundRequest, RefundResponse, SessionIdQuery, VerifySessionResponse, WebhookAckResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct PaymentsAppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub charge_store: Arc<dyn ChargeStore>,
    pub verifier: Arc<WebhookVerifier>,
    pub public_domain: String,
    pub price_id: Option<String>,
    pub require_livemode: bool,
}

impl PaymentsAppState {
    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.gateway.clone(),
            self.public_domain.clone(),
            self.price_id.clone(),
        )
    }

    pub fn refund_handler(&self) -> IssueRefundHandler {
        IssueRefundHandler::new(self.gateway.clone())
    }

    pub fn refund_history_handler(&self) -> GetRefundHistoryHandler {
        GetRefundHistoryHandler::new(self.gateway.clone())
    }

    pub fn verify_session_handler(&self) -> VerifySessionHandler {
        VerifySessionHandler::new(self.gateway.clone())
    }

    pub fn webhook_handler(&self) -> ProcessWebhookHandler {
        ProcessWebhookHandler::new(
            self.verifier.clone(),
            EventPipeline::new(self.charge_store.clone()),
        )
        .with_require_livemode(self.require_livemode)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// HTTP-facing error wrapper.
///
/// Validation failures, missing objects, and permanent provider rejections
/// are the caller's problem (400). Transient provider failures are ours
/// (502) so clients know a retry may succeed.
pub struct ApiError(PaymentsError);

impl From<PaymentsError> for ApiError {
    fn from(err: PaymentsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_retryable() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

fn webhook_error_response(err: WebhookError) -> Response {
    warn!(error = %err, "webhook rejected");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(err.to_string())),
    )
        .into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /create-checkout-session
pub async fn create_checkout_session(
    State(state): State<PaymentsAppState>,
    Json(request): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let metadata = request.metadata.unwrap_or_default();
    let result = state
        .checkout_handler()
        .handle(CreateCheckoutSessionCommand {
            price_id: request.price_id,
            user_id: metadata.user_id,
            credit_granted: metadata.credit_granted,
            locale: request.locale.or(metadata.locale),
        })
        .await?;

    Ok(Json(CheckoutSessionResponse { url: result.url }))
}

/// POST /refund
pub async fn issue_refund(
    State(state): State<PaymentsAppState>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, ApiError> {
    let result = state
        .refund_handler()
        .handle(IssueRefundCommand {
            session_id: request.session_id,
            amount: request.amount,
            reason: request.reason,
        })
        .await?;

    Ok(Json(RefundResponse {
        success: true,
        refund: result.refund.into(),
    }))
}

/// GET /refund?session_id=...
pub async fn get_refund_history(
    State(state): State<PaymentsAppState>,
    Query(query): Query<SessionIdQuery>,
) -> Result<Json<RefundHistoryResponse>, ApiError> {
    let result = state
        .refund_history_handler()
        .handle(GetRefundHistoryCommand {
            session_id: query.session_id,
        })
        .await?;

    Ok(Json(RefundHistoryResponse {
        session_id: result.session_id,
        payment_status: result.payment_status,
        refunds: result.refunds.into_iter().map(Into::into).collect(),
    }))
}

/// GET /verify-session?session_id=...
pub async fn verify_session(
    State(state): State<PaymentsAppState>,
    Query(query): Query<SessionIdQuery>,
) -> Result<Json<VerifySessionResponse>, ApiError> {
    let session = state
        .verify_session_handler()
        .handle(VerifySessionCommand {
            session_id: query.session_id,
        })
        .await?;

    Ok(Json(session.into()))
}

/// POST /webhook
///
/// Always answers 200 once the signature checks out, whatever happened
/// downstream. Non-2xx responses make the provider redeliver, and a
/// delivery we authenticated and understood must not be redelivered.
pub async fn handle_webhook(
    State(state): State<PaymentsAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = match headers.get("Stripe-Signature").and_then(|v| v.to_str().ok()) {
        Some(signature) => signature,
        None => return webhook_error_response(WebhookError::MissingSignature),
    };

    match state.webhook_handler().handle(&body, signature).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAckResponse::ok())).into_response(),
        Err(err) => webhook_error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors_map_to_bad_gateway() {
        let response = ApiError(PaymentsError::Remote {
            message: "timeout".to_string(),
            retryable: true,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let response =
            ApiError(PaymentsError::validation("userId", "must not be empty")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_bad_request() {
        let response = ApiError(PaymentsError::not_found("checkout session")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn permanent_remote_errors_map_to_bad_request() {
        let response = ApiError(PaymentsError::Remote {
            message: "charge already refunded".to_string(),
            retryable: false,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
