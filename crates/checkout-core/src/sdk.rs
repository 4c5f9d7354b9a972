//! Payment SDK Abstraction
//!
//! The hosted checkout widget is reached through two traits: an
//! [`SdkLoader`] that produces an initialized [`PaymentSdk`] once at startup,
//! and the SDK itself, which launches checkout for a payment session.
//!
//! Both are `?Send`: the browser implementation holds JavaScript handles.
//!
//! ```rust,ignore
//! let sdk = loader.load(&SdkConfig::default()).await?;
//! sdk.checkout(&CheckoutOptions::modal(session_id)).await?;
//! ```

use std::rc::Rc;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::attempt::PaymentSessionId;
use crate::error::{CheckoutError, Result};

/// SDK environment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkMode {
    #[default]
    Sandbox,
    Production,
}

impl SdkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SdkMode::Sandbox => "sandbox",
            SdkMode::Production => "production",
        }
    }
}

impl FromStr for SdkMode {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(SdkMode::Sandbox),
            "production" => Ok(SdkMode::Production),
            other => Err(CheckoutError::Config(format!("unknown SDK mode '{other}'"))),
        }
    }
}

/// Configuration passed to [`SdkLoader::load`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    pub mode: SdkMode,
}

/// Where the hosted checkout opens
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectTarget {
    #[default]
    #[serde(rename = "_modal")]
    Modal,
    #[serde(rename = "_self")]
    SelfFrame,
    #[serde(rename = "_blank")]
    Blank,
    #[serde(rename = "_top")]
    Top,
}

impl RedirectTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            RedirectTarget::Modal => "_modal",
            RedirectTarget::SelfFrame => "_self",
            RedirectTarget::Blank => "_blank",
            RedirectTarget::Top => "_top",
        }
    }
}

impl FromStr for RedirectTarget {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "_modal" => Ok(RedirectTarget::Modal),
            "_self" => Ok(RedirectTarget::SelfFrame),
            "_blank" => Ok(RedirectTarget::Blank),
            "_top" => Ok(RedirectTarget::Top),
            other => Err(CheckoutError::Config(format!("unknown redirect target '{other}'"))),
        }
    }
}

/// Options for [`PaymentSdk::checkout`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOptions {
    pub payment_session_id: PaymentSessionId,
    pub redirect_target: RedirectTarget,
}

impl CheckoutOptions {
    pub fn new(payment_session_id: PaymentSessionId, redirect_target: RedirectTarget) -> Self {
        Self {
            payment_session_id,
            redirect_target,
        }
    }

    /// Options that open checkout in the SDK's modal
    pub fn modal(payment_session_id: PaymentSessionId) -> Self {
        Self::new(payment_session_id, RedirectTarget::Modal)
    }
}

/// What the SDK reported when the checkout flow resolved.
///
/// Resolution means the modal closed, not that payment succeeded; the
/// backend's verification is the authority on payment status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    /// The SDK navigated away instead of completing in place
    #[serde(default)]
    pub redirected: bool,

    /// Payment message reported by the widget, if any
    #[serde(default)]
    pub message: Option<String>,

    /// Error reported inside a resolved result (e.g. user closed the modal)
    #[serde(default)]
    pub error: Option<String>,
}

/// An initialized payment SDK instance
#[async_trait(?Send)]
pub trait PaymentSdk {
    /// Open hosted checkout and wait for the flow to resolve
    async fn checkout(&self, options: &CheckoutOptions) -> Result<CheckoutResult>;

    /// SDK name for logs
    fn name(&self) -> &str;
}

/// Produces the shared [`PaymentSdk`] instance
#[async_trait(?Send)]
pub trait SdkLoader {
    async fn load(&self, config: &SdkConfig) -> Result<Rc<dyn PaymentSdk>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_wire_shape() {
        let options = CheckoutOptions::modal(PaymentSessionId::new("sess_abc"));
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"paymentSessionId": "sess_abc", "redirectTarget": "_modal"})
        );
    }

    #[test]
    fn test_mode_defaults_to_sandbox() {
        assert_eq!(SdkConfig::default().mode, SdkMode::Sandbox);
        assert_eq!(serde_json::to_value(SdkConfig::default()).unwrap()["mode"], "sandbox");
    }

    #[test]
    fn test_parse_config_values() {
        assert_eq!("Production".parse::<SdkMode>().unwrap(), SdkMode::Production);
        assert!("live".parse::<SdkMode>().is_err());
        assert_eq!("_top".parse::<RedirectTarget>().unwrap(), RedirectTarget::Top);
        assert!("modal".parse::<RedirectTarget>().is_err());
    }
}
