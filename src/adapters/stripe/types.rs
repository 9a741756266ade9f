//! Wire types for the Stripe REST API.
//!
//! The domain object shapes mirror Stripe's JSON closely enough that most
//! responses deserialize straight into them; this module only carries the
//! list envelope and the error payload.

use serde::Deserialize;

/// Stripe's paginated list envelope.
#[derive(Debug, Deserialize)]
pub struct StripeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// Error payload returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Deserialize)]
pub struct StripeApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub code: Option<String>,
}
