//! Payment provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment provider configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key (sk_test_... or sk_live_...)
    pub stripe_api_key: String,

    /// Stripe webhook signing secret (whsec_...)
    pub stripe_webhook_secret: String,

    /// Default price ID used when checkout requests omit one
    pub stripe_price_id: Option<String>,

    /// Public domain used to build success/cancel redirect URLs
    #[serde(default = "default_public_domain")]
    pub public_domain: String,

    /// Timeout for each call to the provider API, in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Whether to reject test-mode events in production
    #[serde(default)]
    pub require_livemode: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_price_id: None,
            public_domain: default_public_domain(),
            provider_timeout_secs: default_provider_timeout(),
            require_livemode: false,
        }
    }
}

fn default_public_domain() -> String {
    "http://localhost:3000".to_string()
}

fn default_provider_timeout() -> u64 {
    10
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !self.public_domain.starts_with("http://") && !self.public_domain.starts_with("https://")
        {
            return Err(ValidationError::InvalidPublicDomain);
        }

        if self.provider_timeout_secs == 0 || self.provider_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}
