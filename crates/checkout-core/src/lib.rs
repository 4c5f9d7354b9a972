//! # checkout-core
//!
//! Hosted checkout orchestration: collect customer and payment details, get a
//! payment session from the backend, open the payment SDK's checkout modal,
//! then have the backend verify the order.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    CheckoutOrchestrator                       │
//! │  ┌──────────┐   ┌──────────────────┐   ┌──────────────────┐  │
//! │  │ FormData │──▶│  PaymentBackend  │──▶│    PaymentSdk    │  │
//! │  │          │   │ /payment /verify │   │ (hosted checkout)│  │
//! │  └──────────┘   └──────────────────┘   └──────────────────┘  │
//! │        CheckoutAttempt (per submission)  ──▶  UiState         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backends and SDKs plug in through traits, so the same flow runs against
//! the HTTP backend and the browser SDK, or against the scripted doubles in
//! [`mock`].

pub mod attempt;
pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod mock;
pub mod notice;
pub mod orchestrator;
pub mod sdk;

pub use attempt::{AttemptState, CheckoutAttempt, OrderId, PaymentSessionId, SessionGrant};
pub use backend::{PaymentBackend, SessionResponse, VerifyRequest, VerifyResponse};
pub use config::CheckoutConfig;
pub use error::{CheckoutError, Result};
pub use form::{FormData, FormField, ValidationError};
pub use notice::{Notice, NoticeLevel, Notifier, UiState, PAYMENT_VERIFIED};
pub use orchestrator::{CheckoutOrchestrator, CheckoutOrchestratorBuilder, CheckoutOutcome, Verification};
pub use sdk::{CheckoutOptions, CheckoutResult, PaymentSdk, RedirectTarget, SdkConfig, SdkLoader, SdkMode};
