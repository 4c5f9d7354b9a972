//! Payment Backend Interface
//!
//! The remote service that issues payment sessions and verifies orders.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::attempt::{OrderId, PaymentSessionId, SessionGrant};
use crate::error::{CheckoutError, Result};
use crate::form::FormData;

/// Body returned by the session endpoint.
///
/// Both fields are optional on the wire; [`SessionResponse::into_grant`]
/// decides whether the response is usable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub payment_session_id: Option<String>,

    #[serde(default)]
    pub order_id: Option<String>,
}

impl SessionResponse {
    pub fn new(payment_session_id: impl Into<String>, order_id: impl Into<String>) -> Self {
        Self {
            payment_session_id: Some(payment_session_id.into()),
            order_id: Some(order_id.into()),
        }
    }

    /// Read a raw session body.
    ///
    /// A body that is not a JSON object carries no session. Inside an object,
    /// a field that is not a string counts as absent.
    pub fn from_body(body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body);
        let Ok(serde_json::Value::Object(fields)) = parsed else {
            tracing::warn!("Session response is not a JSON object");
            return Self::default();
        };

        let text = |key: &str| match fields.get(key) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(value)) => Some(value.clone()),
            Some(other) => {
                tracing::warn!(field = key, value = %other, "Session response field is not a string");
                None
            }
        };

        Self {
            payment_session_id: text("payment_session_id"),
            order_id: text("order_id"),
        }
    }

    /// Turn the response into a session grant.
    ///
    /// A missing or empty session id is [`CheckoutError::SessionMissing`]; a
    /// session id without an order id is [`CheckoutError::InvalidResponse`].
    pub fn into_grant(self) -> Result<SessionGrant> {
        let payment_session_id = self
            .payment_session_id
            .filter(|id| !id.is_empty())
            .ok_or(CheckoutError::SessionMissing)?;

        let order_id = self
            .order_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CheckoutError::InvalidResponse("order_id missing or not a string".into()))?;

        Ok(SessionGrant {
            payment_session_id: PaymentSessionId::new(payment_session_id),
            order_id: OrderId::new(order_id),
        })
    }
}

/// Body sent to the verification endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub order_id: OrderId,
}

/// Whatever the verification endpoint returned.
///
/// Only the truthiness of the body matters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerifyResponse(pub serde_json::Value);

impl VerifyResponse {
    /// Parse a raw body: JSON when it parses, otherwise the text itself
    pub fn from_body(body: &str) -> Self {
        if body.is_empty() {
            return Self(serde_json::Value::Null);
        }
        Self(
            serde_json::from_str(body)
                .unwrap_or_else(|_| serde_json::Value::String(body.to_string())),
        )
    }

    /// JavaScript truthiness of the body
    pub fn is_truthy(&self) -> bool {
        use serde_json::Value;

        match &self.0 {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// Backend client trait
///
/// Implement this for each transport: HTTP, in-process, scripted test double.
#[async_trait(?Send)]
pub trait PaymentBackend {
    /// Ask the backend for a payment session for this form
    async fn create_session(&self, form: &FormData) -> Result<SessionResponse>;

    /// Ask the backend whether the order was paid
    async fn verify(&self, order_id: &OrderId) -> Result<VerifyResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grant_from_complete_response() {
        let grant = SessionResponse::new("sess_1", "ord_1").into_grant().unwrap();
        assert_eq!(grant.payment_session_id.as_str(), "sess_1");
        assert_eq!(grant.order_id.as_str(), "ord_1");
    }

    #[test]
    fn test_missing_session_id_is_soft_failure() {
        let response: SessionResponse = serde_json::from_value(json!({"order_id": "ord_1"})).unwrap();
        assert!(matches!(response.into_grant(), Err(CheckoutError::SessionMissing)));

        let empty = SessionResponse::new("", "ord_1");
        assert!(matches!(empty.into_grant(), Err(CheckoutError::SessionMissing)));
    }

    #[test]
    fn test_missing_order_id_is_invalid() {
        let response: SessionResponse =
            serde_json::from_value(json!({"payment_session_id": "sess_1"})).unwrap();
        assert!(matches!(response.into_grant(), Err(CheckoutError::InvalidResponse(_))));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let response: SessionResponse = serde_json::from_value(json!({
            "payment_session_id": "sess_1",
            "order_id": "ord_1",
            "cf_order_id": 42
        }))
        .unwrap();
        assert!(response.into_grant().is_ok());
    }

    #[test]
    fn test_from_body_keeps_session_id_beside_bad_order_id() {
        let response = SessionResponse::from_body(r#"{"payment_session_id":"sess_1","order_id":12345}"#);
        assert_eq!(response.payment_session_id.as_deref(), Some("sess_1"));
        assert!(response.order_id.is_none());
        assert!(matches!(response.into_grant(), Err(CheckoutError::InvalidResponse(_))));
    }

    #[test]
    fn test_from_body_without_object_has_no_session() {
        for body in ["", "ok", "[]", r#""sess_1""#] {
            assert_eq!(SessionResponse::from_body(body), SessionResponse::default(), "{body}");
        }
        let numeric = SessionResponse::from_body(r#"{"payment_session_id":7,"order_id":"ord_1"}"#);
        assert!(matches!(numeric.into_grant(), Err(CheckoutError::SessionMissing)));
    }

    #[test]
    fn test_verify_request_uses_camel_case() {
        let body = serde_json::to_value(VerifyRequest { order_id: OrderId::new("ord_xyz") }).unwrap();
        assert_eq!(body, json!({"orderId": "ord_xyz"}));
    }

    #[test]
    fn test_truthiness() {
        for truthy in [r#"{"status":"ok"}"#, "[]", "true", "1", "verified", r#""x""#] {
            assert!(VerifyResponse::from_body(truthy).is_truthy(), "{truthy}");
        }
        for falsy in ["", "null", "false", "0", r#""""#] {
            assert!(!VerifyResponse::from_body(falsy).is_truthy(), "{falsy}");
        }
    }
}
