//! Scripted Collaborators
//!
//! In-memory backend, SDK, loader and notifier for tests and demos. Each one
//! records the calls it receives so a test can assert on what the
//! orchestrator did, not just what it returned.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::attempt::OrderId;
use crate::backend::{PaymentBackend, SessionResponse, VerifyResponse};
use crate::error::{CheckoutError, Result};
use crate::form::FormData;
use crate::notice::Notifier;
use crate::sdk::{CheckoutOptions, CheckoutResult, PaymentSdk, SdkConfig, SdkLoader};

#[derive(Clone, Debug)]
enum Scripted<T> {
    Reply(T),
    Fail(String),
}

/// Backend returning scripted responses
pub struct MockBackend {
    session: Scripted<SessionResponse>,
    queued_sessions: RefCell<VecDeque<SessionResponse>>,
    verify: Scripted<VerifyResponse>,
    session_calls: RefCell<Vec<FormData>>,
    verify_calls: RefCell<Vec<OrderId>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Grants `sess_mock`/`ord_mock` and verifies with `{"status":"ok"}`
    pub fn new() -> Self {
        Self {
            session: Scripted::Reply(SessionResponse::new("sess_mock", "ord_mock")),
            queued_sessions: RefCell::new(VecDeque::new()),
            verify: Scripted::Reply(VerifyResponse(serde_json::json!({"status": "ok"}))),
            session_calls: RefCell::new(Vec::new()),
            verify_calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_session(mut self, response: SessionResponse) -> Self {
        self.session = Scripted::Reply(response);
        self
    }

    /// Answer the next session request with `response`, before the scripted default
    pub fn then_session(self, response: SessionResponse) -> Self {
        self.queued_sessions.borrow_mut().push_back(response);
        self
    }

    /// Session requests fail with a transport error
    pub fn failing_session(mut self, message: impl Into<String>) -> Self {
        self.session = Scripted::Fail(message.into());
        self
    }

    pub fn with_verify(mut self, body: serde_json::Value) -> Self {
        self.verify = Scripted::Reply(VerifyResponse(body));
        self
    }

    /// Verification requests fail with a transport error
    pub fn failing_verify(mut self, message: impl Into<String>) -> Self {
        self.verify = Scripted::Fail(message.into());
        self
    }

    /// Forms received by the session endpoint, in order
    pub fn session_calls(&self) -> Vec<FormData> {
        self.session_calls.borrow().clone()
    }

    /// Order ids received by the verification endpoint, in order
    pub fn verify_calls(&self) -> Vec<OrderId> {
        self.verify_calls.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PaymentBackend for MockBackend {
    async fn create_session(&self, form: &FormData) -> Result<SessionResponse> {
        self.session_calls.borrow_mut().push(form.clone());
        if let Some(response) = self.queued_sessions.borrow_mut().pop_front() {
            return Ok(response);
        }
        match &self.session {
            Scripted::Reply(response) => Ok(response.clone()),
            Scripted::Fail(message) => Err(CheckoutError::Transport(message.clone())),
        }
    }

    async fn verify(&self, order_id: &OrderId) -> Result<VerifyResponse> {
        self.verify_calls.borrow_mut().push(order_id.clone());
        match &self.verify {
            Scripted::Reply(body) => Ok(body.clone()),
            Scripted::Fail(message) => Err(CheckoutError::Transport(message.clone())),
        }
    }
}

/// Releases a [`MockSdk`] created with [`MockSdk::held`]
pub struct ReleaseHandle(oneshot::Sender<()>);

impl ReleaseHandle {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// SDK whose checkout resolves or rejects as scripted
pub struct MockSdk {
    outcome: Scripted<CheckoutResult>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    launches: RefCell<Vec<CheckoutOptions>>,
}

impl MockSdk {
    pub fn resolving() -> Self {
        Self {
            outcome: Scripted::Reply(CheckoutResult::default()),
            gate: RefCell::new(None),
            launches: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            outcome: Scripted::Fail(message.into()),
            ..Self::resolving()
        }
    }

    /// Resolving SDK whose first checkout waits until the handle is released
    pub fn held() -> (Self, ReleaseHandle) {
        let (tx, rx) = oneshot::channel();
        let sdk = Self {
            gate: RefCell::new(Some(rx)),
            ..Self::resolving()
        };
        (sdk, ReleaseHandle(tx))
    }

    pub fn with_result(mut self, result: CheckoutResult) -> Self {
        self.outcome = Scripted::Reply(result);
        self
    }

    /// Options of every launch, in order
    pub fn launches(&self) -> Vec<CheckoutOptions> {
        self.launches.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PaymentSdk for MockSdk {
    async fn checkout(&self, options: &CheckoutOptions) -> Result<CheckoutResult> {
        self.launches.borrow_mut().push(options.clone());

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match &self.outcome {
            Scripted::Reply(result) => Ok(result.clone()),
            Scripted::Fail(message) => Err(CheckoutError::CheckoutLaunch(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "MockSdk"
    }
}

/// Loader handing out a fixed SDK, or failing
pub struct MockSdkLoader {
    sdk: Option<Rc<MockSdk>>,
    loads: Cell<usize>,
    configs: RefCell<Vec<SdkConfig>>,
}

impl MockSdkLoader {
    pub fn available(sdk: Rc<MockSdk>) -> Self {
        Self {
            sdk: Some(sdk),
            loads: Cell::new(0),
            configs: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            sdk: None,
            loads: Cell::new(0),
            configs: RefCell::new(Vec::new()),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.get()
    }

    pub fn configs(&self) -> Vec<SdkConfig> {
        self.configs.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SdkLoader for MockSdkLoader {
    async fn load(&self, config: &SdkConfig) -> Result<Rc<dyn PaymentSdk>> {
        self.loads.set(self.loads.get() + 1);
        self.configs.borrow_mut().push(config.clone());

        match &self.sdk {
            Some(sdk) => Ok(sdk.clone() as Rc<dyn PaymentSdk>),
            None => Err(CheckoutError::SdkLoad("script blocked".into())),
        }
    }
}

/// Notifier that remembers every message
#[derive(Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
