//! Webhook signature verification.
//!
//! Authenticates incoming provider events with HMAC-SHA256 over the raw
//! request body and rejects replayed or stale deliveries by timestamp.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future-dated events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components of the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// v1 signature (HMAC-SHA256).
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<hex signature>`. Unknown scheme fields
    /// are ignored so newer header versions keep verifying.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` when the header is malformed or
    /// either required field is missing.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex_decode(value).ok_or_else(|| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown signature schemes
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// Verifier for provider webhook signatures.
pub struct WebhookVerifier {
    /// Webhook signing secret from the provider dashboard.
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the webhook signature and parses the event payload.
    ///
    /// The signed message is `{timestamp}.{raw_body}`, where `raw_body` is
    /// the exact bytes received on the wire. Re-serializing the JSON before
    /// verification would break the signature.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - computed signature does not match
    /// - `TimestampOutOfRange` - event is older than 5 minutes
    /// - `InvalidTimestamp` - event timestamp is too far in the future
    /// - `ParseError` - header or JSON payload is malformed
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected = self.compute_signature(header.timestamp, payload);
        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(event)
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }

        // Tolerate modest clock skew for future-dated events
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature for the timestamp and payload.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time comparison of two byte slices.
///
/// The length check short-circuits, which is fine: signature length is not
/// secret, only its contents are.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Decodes a lowercase or uppercase hex string, or returns `None`.
fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let hi = hex_nibble(pair[0])?;
        let lo = hex_nibble(pair[1])?;
        out.push((hi << 4) | lo);
    }
    Some(out)
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Signs `{timestamp}.{payload}` with HMAC-SHA256 for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    hex_encode(&mac.finalize().into_bytes())
}
