//! Axum router configuration for payments endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout_session, get_refund_history, handle_webhook, issue_refund, verify_session,
    PaymentsAppState,
};

/// Create the payments API router.
///
/// # Routes
///
/// - `POST /create-checkout-session` - Start a hosted checkout
/// - `POST /refund` - Refund a session's charge
/// - `GET /refund` - List refunds for a session
/// - `GET /verify-session` - Check a session's payment state
pub fn payments_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/create-checkout-session", post(create_checkout_session))
        .route("/refund", post(issue_refund).get(get_refund_history))
        .route("/verify-session", get(verify_session))
}

/// Create the webhook router.
///
/// Separate from the main payments routes because webhooks carry no user
/// auth; they are authenticated by signature instead.
///
/// # Routes
/// - `POST /webhook` - Handle provider webhooks
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

/// Create the complete payments module router, suitable for nesting at
/// `/api`.
pub fn payments_router() -> Router<PaymentsAppState> {
    payments_routes().merge(webhook_routes())
}
