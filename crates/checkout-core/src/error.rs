//! Error Types

use thiserror::Error;

use crate::attempt::AttemptState;
use crate::form::ValidationError;

/// Result type alias for checkout operations
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Checkout error types
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Form failed validation before any network call
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Field name outside the five known form fields
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    /// Payment SDK could not be loaded
    #[error("SDK load failed: {0}")]
    SdkLoad(String),

    /// Checkout requested but the SDK was never initialized
    #[error("Payment SDK is not initialized")]
    SdkUnavailable,

    /// Session response had no `payment_session_id`
    #[error("Session response did not contain a payment session id")]
    SessionMissing,

    /// Backend response could not be used as-is
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    /// Request never produced a response (DNS, connection, decoding)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The SDK rejected the checkout launch
    #[error("Checkout launch failed: {0}")]
    CheckoutLaunch(String),

    /// Verification call failed
    #[error("Verification failed: {0}")]
    Verification(#[source] Box<CheckoutError>),

    /// Another attempt is still running
    #[error("A checkout attempt is already in progress")]
    AttemptInFlight,

    /// Attempt state machine violation
    #[error("Invalid attempt transition: {from:?} -> {to:?}")]
    InvalidTransition { from: AttemptState, to: AttemptState },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Transport(_) | CheckoutError::AttemptInFlight => true,
            CheckoutError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            CheckoutError::Verification(source) => source.is_retryable(),
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Validation(err) => err.to_string(),
            CheckoutError::SdkLoad(_) | CheckoutError::SdkUnavailable => {
                "The payment service could not be loaded. Please refresh the page.".into()
            }
            CheckoutError::SessionMissing | CheckoutError::InvalidResponse(_) => {
                "We could not start your payment. Please try again.".into()
            }
            CheckoutError::Transport(_) | CheckoutError::HttpStatus { .. } => {
                "The payment server is unreachable. Please try again.".into()
            }
            CheckoutError::CheckoutLaunch(_) => "The payment window could not be opened.".into(),
            CheckoutError::Verification(_) => {
                "Your payment could not be verified. Please contact support.".into()
            }
            CheckoutError::AttemptInFlight => "A payment is already in progress.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let server = CheckoutError::HttpStatus { status: 502, body: String::new() };
        let client = CheckoutError::HttpStatus { status: 400, body: String::new() };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!CheckoutError::SessionMissing.is_retryable());
    }

    #[test]
    fn test_verification_keeps_source() {
        use std::error::Error as _;

        let err = CheckoutError::Verification(Box::new(CheckoutError::HttpStatus {
            status: 503,
            body: "busy".into(),
        }));
        assert!(err.is_retryable());
        assert!(err.source().is_some_and(|s| s.to_string().contains("503")));

        let rejected = CheckoutError::Verification(Box::new(CheckoutError::HttpStatus {
            status: 404,
            body: String::new(),
        }));
        assert!(!rejected.is_retryable());
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = CheckoutError::Transport("dns error: secure-pay-api".into());
        assert!(!err.user_message().contains("dns"));
    }
}
