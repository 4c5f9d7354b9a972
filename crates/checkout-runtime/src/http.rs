//! HTTP Payment Backend
//!
//! Implementation of `PaymentBackend` for the remote payment API.

use async_trait::async_trait;
use serde::Serialize;

use checkout_core::{
    backend::{PaymentBackend, SessionResponse, VerifyRequest, VerifyResponse},
    error::{CheckoutError, Result},
    FormData, OrderId,
};

/// Longest error body kept in [`CheckoutError::HttpStatus`]
const MAX_ERROR_BODY: usize = 512;

/// Payment API configuration
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// API origin, without trailing slash
    pub base_url: String,

    /// Session creation endpoint
    pub session_path: String,

    /// Verification endpoint
    pub verify_path: String,

    /// Request timeout in seconds (native only, unset means none)
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://secure-pay-api.vercel.app".into(),
            session_path: "/payment".into(),
            verify_path: "/verify".into(),
            timeout_secs: None,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("CHECKOUT_API_BASE_URL")
            .unwrap_or_else(|_| Self::default().base_url);
        let timeout_secs = std::env::var("CHECKOUT_API_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok());

        Self {
            base_url,
            timeout_secs,
            ..Default::default()
        }
    }

    pub fn session_url(&self) -> String {
        self.endpoint(&self.session_path)
    }

    pub fn verify_url(&self) -> String {
        self.endpoint(&self.verify_path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Payment backend over HTTP
pub struct HttpPaymentBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpPaymentBackend {
    /// Create from configuration
    pub fn new(config: BackendConfig) -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = reqwest::Client::builder();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| CheckoutError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(BackendConfig::from_env())
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// POST a JSON body, returning the raw response text of a 2xx answer
    async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        tracing::debug!(url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "Payment API returned an error status");
            return Err(CheckoutError::HttpStatus {
                status: status.as_u16(),
                body: truncate(text),
            });
        }

        Ok(text)
    }
}

#[async_trait(?Send)]
impl PaymentBackend for HttpPaymentBackend {
    async fn create_session(&self, form: &FormData) -> Result<SessionResponse> {
        let body = self.post_json(&self.config.session_url(), form).await?;
        Ok(SessionResponse::from_body(&body))
    }

    async fn verify(&self, order_id: &OrderId) -> Result<VerifyResponse> {
        let request = VerifyRequest {
            order_id: order_id.clone(),
        };
        let body = self.post_json(&self.config.verify_url(), &request).await?;
        Ok(VerifyResponse::from_body(&body))
    }
}

fn transport_error(err: reqwest::Error) -> CheckoutError {
    CheckoutError::Transport(err.to_string())
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::rc::Rc;

    use checkout_core::mock::{MockSdk, RecordingNotifier};
    use checkout_core::{CheckoutOrchestrator, FormField, PAYMENT_VERIFIED};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn jane() -> FormData {
        FormData::new()
            .with(FormField::CustomerId, "C1")
            .with(FormField::CustomerPhone, "9999999999")
            .with(FormField::CustomerName, "Jane")
            .with(FormField::CustomerEmail, "j@x.com")
            .with(FormField::Amount, "100.50")
    }

    fn backend_for(server: &MockServer) -> HttpPaymentBackend {
        HttpPaymentBackend::new(BackendConfig::new(server.uri())).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.session_url(), "https://secure-pay-api.vercel.app/payment");
        assert_eq!(config.verify_url(), "https://secure-pay-api.vercel.app/verify");
        assert!(config.timeout_secs.is_none());
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let config = BackendConfig::new("http://localhost:8080/");
        assert_eq!(config.session_url(), "http://localhost:8080/payment");
    }

    #[tokio::test]
    async fn test_create_session_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment"))
            .and(body_json(json!({
                "customer_id": "C1",
                "customer_phone": "9999999999",
                "customer_name": "Jane",
                "customer_email": "j@x.com",
                "amount": "100.50"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payment_session_id": "sess_1",
                "order_id": "ord_1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server).create_session(&jane()).await.unwrap();

        assert_eq!(response, SessionResponse::new("sess_1", "ord_1"));
    }

    #[tokio::test]
    async fn test_non_object_session_body_has_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let response = backend_for(&server).create_session(&jane()).await.unwrap();

        assert!(matches!(response.into_grant(), Err(CheckoutError::SessionMissing)));
    }

    #[tokio::test]
    async fn test_numeric_order_id_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payment_session_id": "sess_1",
                "order_id": 12345
            })))
            .mount(&server)
            .await;

        let response = backend_for(&server).create_session(&jane()).await.unwrap();

        assert_eq!(response.payment_session_id.as_deref(), Some("sess_1"));
        assert!(matches!(response.into_grant(), Err(CheckoutError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = backend_for(&server).create_session(&jane()).await.unwrap_err();

        match err {
            CheckoutError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let backend = HttpPaymentBackend::new(BackendConfig::new("http://127.0.0.1:9")).unwrap();

        let err = backend.verify(&OrderId::new("ord_1")).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_verify_posts_order_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .and(body_json(json!({"orderId": "ord_xyz"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server).verify(&OrderId::new("ord_xyz")).await.unwrap();

        assert!(response.is_truthy());
    }

    #[tokio::test]
    async fn test_verify_empty_body_is_falsy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let response = backend_for(&server).verify(&OrderId::new("ord_1")).await.unwrap();

        assert!(!response.is_truthy());
    }

    #[tokio::test]
    async fn test_full_checkout_against_http_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payment_session_id": "sess_abc",
                "order_id": "ord_xyz"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/verify"))
            .and(body_json(json!({"orderId": "ord_xyz"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let sdk = Rc::new(MockSdk::resolving());
        let notifier = Rc::new(RecordingNotifier::new());
        let orchestrator = CheckoutOrchestrator::builder()
            .backend(Rc::new(backend_for(&server)))
            .notifier(notifier.clone())
            .sdk(sdk.clone())
            .form(jane())
            .build()
            .unwrap();

        let outcome = orchestrator.submit().await;

        assert!(outcome.is_verified());
        assert_eq!(sdk.launches()[0].payment_session_id.as_str(), "sess_abc");
        assert_eq!(notifier.messages(), vec![PAYMENT_VERIFIED.to_string()]);
    }
}
