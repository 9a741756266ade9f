//! Domain-level error type for payment operations.

use thiserror::Error;

/// Errors surfaced by payment operations outside the webhook path.
#[derive(Debug, Error)]
pub enum PaymentsError {
    /// A request field failed validation.
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// A referenced object does not exist at the provider.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The payment provider returned an error or was unreachable.
    #[error("Provider error: {message}")]
    Remote { message: String, retryable: bool },
}

impl PaymentsError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { retryable: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = PaymentsError::validation("userId", "must not be empty");
        assert!(!err.is_retryable());
    }

    #[test]
    fn remote_errors_carry_retryability() {
        let transient = PaymentsError::Remote {
            message: "timeout".to_string(),
            retryable: true,
        };
        let permanent = PaymentsError::Remote {
            message: "no such refund".to_string(),
            retryable: false,
        };
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());
    }
}
