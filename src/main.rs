//! glowup-payments server binary.
//!
//! Loads configuration from the environment, wires the Stripe gateway into
//! the HTTP router, and serves the payments API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glowup_payments::adapters::http::payments::{payments_router, PaymentsAppState};
use glowup_payments::adapters::stripe::{StripeGateway, StripeGatewayConfig};
use glowup_payments::config::AppConfig;
use glowup_payments::domain::payment::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let gateway = Arc::new(StripeGateway::new(
        StripeGatewayConfig::new(config.payment.stripe_api_key.clone())
            .with_price_id(config.payment.stripe_price_id.clone())
            .with_timeout(Duration::from_secs(config.payment.provider_timeout_secs)),
    )?);

    let state = PaymentsAppState {
        gateway: gateway.clone(),
        charge_store: gateway,
        verifier: Arc::new(WebhookVerifier::new(
            config.payment.stripe_webhook_secret.clone(),
        )),
        public_domain: config.payment.public_domain.clone(),
        price_id: config.payment.stripe_price_id.clone(),
        require_livemode: config.payment.require_livemode,
    };

    let cors = build_cors_layer(&config);

    let app = Router::new()
        .nest("/api", payments_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    let addr = config.server.socket_addr();
    info!(%addr, environment = ?config.server.environment, "starting payments server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(parsed)
    }
}
