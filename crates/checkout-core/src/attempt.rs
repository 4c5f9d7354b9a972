//! Checkout Attempts
//!
//! Each submission runs inside its own [`CheckoutAttempt`], which carries the
//! session identifier and order id obtained for that attempt. Nothing about
//! an in-flight attempt lives in shared state, so a late verification can
//! never pick up an order id belonging to a newer attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};

/// Payment session identifier handed to the SDK
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentSessionId(String);

impl PaymentSessionId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend order identifier used for verification
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique attempt identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(String);

impl AttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session identifier and order id granted together by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub payment_session_id: PaymentSessionId,
    pub order_id: OrderId,
}

/// Where an attempt currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Idle,
    Rejected,
    SessionRequested,
    SessionFailed,
    SdkUnavailable,
    ModalLaunched,
    ModalCompleted,
    ModalFailed,
    Verifying,
    Verified,
    Unconfirmed,
    VerifyFailed,
}

impl AttemptState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptState::Rejected
                | AttemptState::SessionFailed
                | AttemptState::SdkUnavailable
                | AttemptState::ModalFailed
                | AttemptState::Verified
                | AttemptState::Unconfirmed
                | AttemptState::VerifyFailed
        )
    }

    /// Whether `next` may follow `self`
    pub fn can_transition_to(self, next: AttemptState) -> bool {
        use AttemptState::*;

        matches!(
            (self, next),
            (Idle, Rejected | SessionRequested)
                | (SessionRequested, SessionFailed | SdkUnavailable | ModalLaunched)
                | (ModalLaunched, ModalCompleted | ModalFailed)
                | (ModalCompleted, Verifying)
                | (Verifying, Verified | Unconfirmed | VerifyFailed)
        )
    }
}

/// Context for one checkout attempt
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutAttempt {
    pub id: AttemptId,
    state: AttemptState,
    grant: Option<SessionGrant>,
    history: Vec<AttemptState>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckoutAttempt {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: AttemptId::new(),
            state: AttemptState::Idle,
            grant: None,
            history: vec![AttemptState::Idle],
            started_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// States visited so far, starting with `Idle`
    pub fn history(&self) -> &[AttemptState] {
        &self.history
    }

    pub fn grant(&self) -> Option<&SessionGrant> {
        self.grant.as_ref()
    }

    pub fn order_id(&self) -> Option<&OrderId> {
        self.grant.as_ref().map(|g| &g.order_id)
    }

    pub(crate) fn set_grant(&mut self, grant: SessionGrant) {
        self.grant = Some(grant);
        self.updated_at = Utc::now();
    }

    /// Move to `next`, rejecting moves the state machine does not allow
    pub fn transition(&mut self, next: AttemptState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(CheckoutError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!(attempt_id = %self.id, from = ?self.state, to = ?next, "Attempt transition");
        self.state = next;
        self.history.push(next);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.started_at
    }
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}
