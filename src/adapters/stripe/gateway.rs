//! Stripe REST API gateway.
//!
//! Implements `ChargeStore` and `PaymentGateway` against the Stripe v1 API.
//! Requests are form-encoded with the secret key as HTTP basic auth user,
//! matching Stripe's API conventions.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::domain::payment::{Charge, CheckoutSession, Metadata, PaymentIntent, Refund};
use crate::ports::{
    ChargeStore, CreateCheckoutSessionRequest, CreateRefundRequest, GatewayError,
    GatewayErrorCode, PaymentGateway,
};

use super::types::{StripeErrorResponse, StripeList};

/// Fallback inline price when no price ID is configured.
const DEFAULT_UNIT_AMOUNT: i64 = 7900;
const DEFAULT_CURRENCY: &str = "usd";
const DEFAULT_PRODUCT_NAME: &str = "GlowUp Premium Plan";

/// Stripe gateway configuration.
#[derive(Clone)]
pub struct StripeGatewayConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    base_url: String,

    /// Price ID for checkout sessions; falls back to inline price data.
    price_id: Option<String>,

    /// Per-request timeout.
    timeout: Duration,
}

impl StripeGatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: "https://api.stripe.com".to_string(),
            price_id: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_price_id(mut self, price_id: Option<String>) -> Self {
        self.price_id = price_id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe payment gateway.
pub struct StripeGateway {
    config: StripeGatewayConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeGatewayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::provider(format!("http client init: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(map_transport_error)?;

        decode_response(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(map_transport_error)?;

        decode_response(response).await
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::timeout(err.to_string())
    } else {
        GatewayError::network(err.to_string())
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::network(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<StripeErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.clone());
        error!(status = %status, error = %message, "stripe api error");

        let code = match status.as_u16() {
            404 => GatewayErrorCode::NotFound,
            429 => GatewayErrorCode::RateLimited,
            _ => GatewayErrorCode::Provider,
        };
        return Err(GatewayError::new(code, message));
    }

    serde_json::from_str(&body).map_err(|e| GatewayError::parse(e.to_string()))
}

/// Appends `prefix[Key]=value` form entries for each metadata key.
fn push_metadata_params(params: &mut Vec<(String, String)>, prefix: &str, metadata: &Metadata) {
    for (key, value) in metadata.iter() {
        params.push((format!("{}[{}]", prefix, key), value.to_string()));
    }
}

#[async_trait]
impl ChargeStore for StripeGateway {
    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        self.get_json(&format!("/v1/payment_intents/{}", intent_id))
            .await
    }

    async fn retrieve_charge(&self, charge_id: &str) -> Result<Charge, GatewayError> {
        self.get_json(&format!("/v1/charges/{}", charge_id)).await
    }

    async fn list_charges(
        &self,
        payment_intent_id: &str,
        limit: u8,
    ) -> Result<Vec<Charge>, GatewayError> {
        let list: StripeList<Charge> = self
            .get_json(&format!(
                "/v1/charges?payment_intent={}&limit={}",
                payment_intent_id, limit
            ))
            .await?;
        Ok(list.data)
    }

    async fn update_charge_metadata(
        &self,
        charge_id: &str,
        metadata: &Metadata,
    ) -> Result<Charge, GatewayError> {
        let mut params = Vec::new();
        push_metadata_params(&mut params, "metadata", metadata);

        self.post_form(&format!("/v1/charges/{}", charge_id), &params)
            .await
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("locale".to_string(), request.locale),
            ("success_url".to_string(), request.success_url),
            ("cancel_url".to_string(), request.cancel_url),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];

        match request.price_id.or_else(|| self.config.price_id.clone()) {
            Some(price_id) => {
                params.push(("line_items[0][price]".to_string(), price_id));
            }
            None => {
                params.push((
                    "line_items[0][price_data][currency]".to_string(),
                    DEFAULT_CURRENCY.to_string(),
                ));
                params.push((
                    "line_items[0][price_data][unit_amount]".to_string(),
                    DEFAULT_UNIT_AMOUNT.to_string(),
                ));
                params.push((
                    "line_items[0][price_data][product_data][name]".to_string(),
                    DEFAULT_PRODUCT_NAME.to_string(),
                ));
            }
        }

        // Stamp metadata on the session and on the payment intent it will
        // create, so both sides of the event stream carry it.
        push_metadata_params(&mut params, "metadata", &request.metadata);
        push_metadata_params(
            &mut params,
            "payment_intent_data[metadata]",
            &request.metadata,
        );

        self.post_form("/v1/checkout/sessions", &params).await
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        self.get_json(&format!("/v1/checkout/sessions/{}", session_id))
            .await
    }

    async fn create_refund(&self, request: CreateRefundRequest) -> Result<Refund, GatewayError> {
        let mut params = vec![("charge".to_string(), request.charge_id)];

        if let Some(amount) = request.amount_minor {
            params.push(("amount".to_string(), amount.to_string()));
        }
        if let Some(reason) = request.reason {
            params.push(("reason".to_string(), reason));
        }

        self.post_form("/v1/refunds", &params).await
    }

    async fn list_refunds(&self, charge_id: &str) -> Result<Vec<Refund>, GatewayError> {
        let list: StripeList<Refund> = self
            .get_json(&format!("/v1/refunds?charge={}", charge_id))
            .await?;
        Ok(list.data)
    }
}
