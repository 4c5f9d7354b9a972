//! Checkout Orchestrator
//!
//! Sequences one checkout attempt:
//!
//! ```text
//! validate ─▶ request session ─▶ launch hosted checkout ─▶ verify ─▶ notify
//!    │              │                     │                  │
//!    ▼              ▼                     ▼                  ▼
//! Rejected    SessionFailed /        ModalFailed     Unconfirmed /
//!             SdkUnavailable                         VerifyFailed
//! ```
//!
//! Every stage is awaited in order and its failure becomes a
//! [`CheckoutOutcome`] plus a user-facing [`Notice`] in [`UiState`].

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

use crate::attempt::{AttemptState, CheckoutAttempt, OrderId, PaymentSessionId, SessionGrant};
use crate::backend::PaymentBackend;
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::form::{FormData, FormField, ValidationError};
use crate::notice::{LogNotifier, Notice, Notifier, UiState, PAYMENT_VERIFIED};
use crate::sdk::{CheckoutOptions, PaymentSdk, SdkLoader};

/// Result of a verification call that reached the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verification {
    /// Backend answered with a truthy body
    Confirmed,
    /// Backend answered, but with nothing truthy
    Unconfirmed,
}

/// How a submission ended
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Form constraints failed; nothing was sent
    Rejected(ValidationError),
    /// Another attempt was still running; nothing was sent
    Busy,
    SessionFailed(CheckoutError),
    /// Session obtained but the SDK never loaded
    SdkUnavailable,
    ModalFailed(CheckoutError),
    Verified { order_id: OrderId },
    Unconfirmed { order_id: OrderId },
    VerifyFailed { order_id: OrderId, error: CheckoutError },
}

impl CheckoutOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, CheckoutOutcome::Verified { .. })
    }

    /// Terminal attempt state, `None` when no attempt ran
    pub fn state(&self) -> Option<AttemptState> {
        match self {
            CheckoutOutcome::Rejected(_) => Some(AttemptState::Rejected),
            CheckoutOutcome::Busy => None,
            CheckoutOutcome::SessionFailed(_) => Some(AttemptState::SessionFailed),
            CheckoutOutcome::SdkUnavailable => Some(AttemptState::SdkUnavailable),
            CheckoutOutcome::ModalFailed(_) => Some(AttemptState::ModalFailed),
            CheckoutOutcome::Verified { .. } => Some(AttemptState::Verified),
            CheckoutOutcome::Unconfirmed { .. } => Some(AttemptState::Unconfirmed),
            CheckoutOutcome::VerifyFailed { .. } => Some(AttemptState::VerifyFailed),
        }
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            CheckoutOutcome::Verified { order_id }
            | CheckoutOutcome::Unconfirmed { order_id }
            | CheckoutOutcome::VerifyFailed { order_id, .. } => Some(order_id),
            _ => None,
        }
    }

    /// What the user should see for this outcome
    pub fn notice(&self) -> Notice {
        match self {
            CheckoutOutcome::Rejected(err) => Notice::error(err.to_string()),
            CheckoutOutcome::Busy => Notice::error(CheckoutError::AttemptInFlight.user_message()),
            CheckoutOutcome::SessionFailed(err)
            | CheckoutOutcome::ModalFailed(err)
            | CheckoutOutcome::VerifyFailed { error: err, .. } => Notice::error(err.user_message()),
            CheckoutOutcome::SdkUnavailable => {
                Notice::error(CheckoutError::SdkUnavailable.user_message())
            }
            CheckoutOutcome::Verified { .. } => Notice::success(PAYMENT_VERIFIED),
            CheckoutOutcome::Unconfirmed { .. } => Notice::error(
                "Your payment has not been confirmed yet. Please check again shortly.",
            ),
        }
    }
}

/// Decrements the in-flight counter when the attempt ends or is dropped
struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Owns form state and the shared SDK instance, and drives checkout attempts
pub struct CheckoutOrchestrator {
    backend: Rc<dyn PaymentBackend>,
    notifier: Rc<dyn Notifier>,
    config: CheckoutConfig,
    sdk: OnceCell<Rc<dyn PaymentSdk>>,
    form: RefCell<FormData>,
    last_order_id: RefCell<Option<OrderId>>,
    last_attempt: RefCell<Option<CheckoutAttempt>>,
    ui: RefCell<UiState>,
    in_flight: Cell<usize>,
}

impl CheckoutOrchestrator {
    pub fn new(
        backend: Rc<dyn PaymentBackend>,
        notifier: Rc<dyn Notifier>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            backend,
            notifier,
            config,
            sdk: OnceCell::new(),
            form: RefCell::new(FormData::default()),
            last_order_id: RefCell::new(None),
            last_attempt: RefCell::new(None),
            ui: RefCell::new(UiState::default()),
            in_flight: Cell::new(0),
        }
    }

    pub fn builder() -> CheckoutOrchestratorBuilder {
        CheckoutOrchestratorBuilder::new()
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Current form contents
    pub fn form(&self) -> FormData {
        self.form.borrow().clone()
    }

    pub fn ui_state(&self) -> UiState {
        self.ui.borrow().clone()
    }

    /// Order id from the most recent successful session request
    pub fn last_order_id(&self) -> Option<OrderId> {
        self.last_order_id.borrow().clone()
    }

    /// Context of the most recently finished attempt
    pub fn last_attempt(&self) -> Option<CheckoutAttempt> {
        self.last_attempt.borrow().clone()
    }

    pub fn sdk_ready(&self) -> bool {
        self.sdk.get().is_some()
    }

    /// Load the SDK once. Failure is logged and leaves the SDK unset.
    pub async fn initialize_sdk(&self, loader: &dyn SdkLoader) -> Result<()> {
        if self.sdk_ready() {
            tracing::debug!("Payment SDK already initialized");
            return Ok(());
        }

        match loader.load(&self.config.sdk).await {
            Ok(sdk) => {
                tracing::info!(sdk = sdk.name(), mode = self.config.sdk.mode.as_str(), "Payment SDK loaded");
                if self.sdk.set(sdk).is_err() {
                    tracing::warn!("Payment SDK was initialized concurrently, keeping the first instance");
                }
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, "Error loading payment SDK");
                Err(error)
            }
        }
    }

    pub fn update_field(&self, field: FormField, value: impl Into<String>) {
        self.form.borrow_mut().set(field, value);
    }

    /// [`Self::update_field`] keyed by the input's `name` attribute
    pub fn update_field_by_name(&self, name: &str, value: impl Into<String>) -> Result<()> {
        let field: FormField = name.parse()?;
        self.update_field(field, value);
        Ok(())
    }

    /// Request a payment session for the current form.
    ///
    /// On success the order id is stored on `attempt` and as
    /// [`Self::last_order_id`].
    pub async fn request_session(&self, attempt: &mut CheckoutAttempt) -> Result<PaymentSessionId> {
        let form = self.form();
        let grant = self.request_grant(&form, attempt).await?;
        Ok(grant.payment_session_id)
    }

    async fn request_grant(&self, form: &FormData, attempt: &mut CheckoutAttempt) -> Result<SessionGrant> {
        Self::advance(attempt, AttemptState::SessionRequested);

        let result = match self.backend.create_session(form).await {
            Ok(response) => response.into_grant(),
            Err(error) => Err(error),
        };

        match result {
            Ok(grant) => {
                tracing::info!(attempt_id = %attempt.id, order_id = %grant.order_id, "Payment session created");
                *self.last_order_id.borrow_mut() = Some(grant.order_id.clone());
                attempt.set_grant(grant.clone());
                Ok(grant)
            }
            Err(error) => {
                tracing::error!(attempt_id = %attempt.id, %error, "Error getting session ID");
                Self::advance(attempt, AttemptState::SessionFailed);
                Err(error)
            }
        }
    }

    /// Ask the backend to verify `order_id`; a truthy answer notifies the user
    pub async fn verify_payment(&self, order_id: &OrderId) -> Result<Verification> {
        let response = match self.backend.verify(order_id).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%order_id, %error, "Error verifying payment");
                let error = CheckoutError::Verification(Box::new(error));
                self.set_notice(Notice::error(error.user_message()));
                return Err(error);
            }
        };

        if response.is_truthy() {
            tracing::info!(%order_id, "Payment verified");
            self.set_notice(Notice::success(PAYMENT_VERIFIED));
            self.notifier.notify(PAYMENT_VERIFIED);
            Ok(Verification::Confirmed)
        } else {
            tracing::warn!(%order_id, "Verification returned an empty response");
            Ok(Verification::Unconfirmed)
        }
    }

    /// Form submit handler: validate, request a session, launch checkout, verify
    pub async fn submit(&self) -> CheckoutOutcome {
        let form = self.form();
        let mut attempt = CheckoutAttempt::new();

        if let Err(err) = form.validate() {
            tracing::info!(attempt_id = %attempt.id, %err, "Checkout rejected by form validation");
            Self::advance(&mut attempt, AttemptState::Rejected);
            return self.finish(attempt, CheckoutOutcome::Rejected(err));
        }

        if !self.config.allow_concurrent_attempts && self.in_flight.get() > 0 {
            tracing::warn!(attempt_id = %attempt.id, "Checkout already in progress, ignoring submission");
            let outcome = CheckoutOutcome::Busy;
            self.set_notice(outcome.notice());
            return outcome;
        }

        let guard = InFlight::enter(&self.in_flight);
        {
            let mut ui = self.ui.borrow_mut();
            ui.busy = true;
            ui.notice = None;
            ui.phase = AttemptState::SessionRequested;
        }

        let outcome = self.run_attempt(&form, &mut attempt).await;
        drop(guard);

        self.finish(attempt, outcome)
    }

    async fn run_attempt(&self, form: &FormData, attempt: &mut CheckoutAttempt) -> CheckoutOutcome {
        let grant = match self.request_grant(form, attempt).await {
            Ok(grant) => grant,
            Err(error) => return CheckoutOutcome::SessionFailed(error),
        };

        let Some(sdk) = self.sdk.get().cloned() else {
            tracing::warn!(attempt_id = %attempt.id, "Payment SDK not initialized, checkout not launched");
            Self::advance(attempt, AttemptState::SdkUnavailable);
            return CheckoutOutcome::SdkUnavailable;
        };

        let options = CheckoutOptions::new(grant.payment_session_id.clone(), self.config.redirect_target);
        Self::advance(attempt, AttemptState::ModalLaunched);

        match sdk.checkout(&options).await {
            Ok(result) => {
                tracing::info!(
                    attempt_id = %attempt.id,
                    redirected = result.redirected,
                    message = result.message.as_deref().unwrap_or(""),
                    "Payment initialized"
                );
                if let Some(reported) = &result.error {
                    tracing::warn!(attempt_id = %attempt.id, error = %reported, "Checkout resolved with an error");
                }
                Self::advance(attempt, AttemptState::ModalCompleted);
            }
            Err(error) => {
                tracing::error!(attempt_id = %attempt.id, %error, "Error initializing payment");
                Self::advance(attempt, AttemptState::ModalFailed);
                return CheckoutOutcome::ModalFailed(error);
            }
        }

        Self::advance(attempt, AttemptState::Verifying);
        let order_id = grant.order_id;

        match self.verify_payment(&order_id).await {
            Ok(Verification::Confirmed) => {
                Self::advance(attempt, AttemptState::Verified);
                CheckoutOutcome::Verified { order_id }
            }
            Ok(Verification::Unconfirmed) => {
                Self::advance(attempt, AttemptState::Unconfirmed);
                CheckoutOutcome::Unconfirmed { order_id }
            }
            Err(error) => {
                Self::advance(attempt, AttemptState::VerifyFailed);
                CheckoutOutcome::VerifyFailed { order_id, error }
            }
        }
    }

    fn advance(attempt: &mut CheckoutAttempt, next: AttemptState) {
        if let Err(error) = attempt.transition(next) {
            tracing::error!(attempt_id = %attempt.id, %error, "Attempt state machine violated");
        }
    }

    fn set_notice(&self, notice: Notice) {
        self.ui.borrow_mut().notice = Some(notice);
    }

    fn finish(&self, attempt: CheckoutAttempt, outcome: CheckoutOutcome) -> CheckoutOutcome {
        tracing::debug!(
            attempt_id = %attempt.id,
            state = ?attempt.state(),
            elapsed_ms = attempt.duration().num_milliseconds(),
            "Attempt finished"
        );

        {
            let mut ui = self.ui.borrow_mut();
            ui.phase = attempt.state();
            ui.notice = Some(outcome.notice());
            ui.busy = self.in_flight.get() > 0;
        }
        *self.last_attempt.borrow_mut() = Some(attempt);

        outcome
    }
}

/// Builder for [`CheckoutOrchestrator`]
pub struct CheckoutOrchestratorBuilder {
    backend: Option<Rc<dyn PaymentBackend>>,
    notifier: Option<Rc<dyn Notifier>>,
    sdk: Option<Rc<dyn PaymentSdk>>,
    config: CheckoutConfig,
    form: FormData,
}

impl Default for CheckoutOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            notifier: None,
            sdk: None,
            config: CheckoutConfig::default(),
            form: FormData::default(),
        }
    }

    pub fn backend(mut self, backend: Rc<dyn PaymentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Start with an already-initialized SDK
    pub fn sdk(mut self, sdk: Rc<dyn PaymentSdk>) -> Self {
        self.sdk = Some(sdk);
        self
    }

    pub fn config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Prefill the form
    pub fn form(mut self, form: FormData) -> Self {
        self.form = form;
        self
    }

    pub fn build(self) -> Result<CheckoutOrchestrator> {
        let backend = self
            .backend
            .ok_or_else(|| CheckoutError::Config("Payment backend is required".into()))?;
        let notifier = self.notifier.unwrap_or_else(|| Rc::new(LogNotifier));

        let orchestrator = CheckoutOrchestrator::new(backend, notifier, self.config);
        *orchestrator.form.borrow_mut() = self.form;
        if let Some(sdk) = self.sdk {
            let _ = orchestrator.sdk.set(sdk);
        }
        Ok(orchestrator)
    }
}
