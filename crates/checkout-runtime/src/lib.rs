//! # checkout-runtime
//!
//! Concrete collaborators for the checkout orchestrator.
//!
//! ## Backends
//!
//! - **HTTP** (default): the remote payment API's `/payment` and `/verify`
//!   endpoints over `reqwest`. Compiles for native targets and `wasm32`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use checkout_runtime::{CheckoutOrchestrator, HttpPaymentBackend};
//!
//! let backend = HttpPaymentBackend::from_env()?;
//! let orchestrator = CheckoutOrchestrator::builder()
//!     .backend(Rc::new(backend))
//!     .build()?;
//! ```

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{BackendConfig, HttpPaymentBackend};

// Re-export core types for convenience
pub use checkout_core::{
    CheckoutConfig, CheckoutError, CheckoutOrchestrator, CheckoutOutcome, FormData, FormField,
    Notifier, PaymentBackend, PaymentSdk, Result, SdkLoader,
};
