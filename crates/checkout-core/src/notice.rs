//! User-Facing Feedback
//!
//! [`Notifier`] is the blocking confirmation surface (a browser alert, a
//! terminal line). [`UiState`] is what a view renders after each attempt.

use serde::{Deserialize, Serialize};

use crate::attempt::AttemptState;

/// Confirmation shown once a payment is verified
pub const PAYMENT_VERIFIED: &str = "Payment verified";

/// Blocking user notification
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Notifier that only logs
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!(notification = message, "User notification");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Message rendered next to the form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Snapshot of what the view should show
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    /// State the latest attempt ended in (or is in)
    pub phase: AttemptState,

    /// Latest feedback, cleared when a new attempt starts
    pub notice: Option<Notice>,

    /// An attempt is running
    pub busy: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: AttemptState::Idle,
            notice: None,
            busy: false,
        }
    }
}
