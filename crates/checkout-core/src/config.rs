//! Orchestrator Configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sdk::{RedirectTarget, SdkConfig};

/// Checkout orchestrator configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Passed to the SDK loader at startup
    #[serde(default)]
    pub sdk: SdkConfig,

    /// Where hosted checkout opens
    #[serde(default)]
    pub redirect_target: RedirectTarget,

    /// Let a second submission start while one is in flight
    #[serde(default)]
    pub allow_concurrent_attempts: bool,
}

impl CheckoutConfig {
    /// Read `CHECKOUT_SDK_MODE` and `CHECKOUT_REDIRECT_TARGET`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(mode) = std::env::var("CHECKOUT_SDK_MODE") {
            config.sdk.mode = mode.parse()?;
        }
        if let Ok(target) = std::env::var("CHECKOUT_REDIRECT_TARGET") {
            config.redirect_target = target.parse()?;
        }
        if let Ok(flag) = std::env::var("CHECKOUT_ALLOW_CONCURRENT") {
            config.allow_concurrent_attempts = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::SdkMode;

    #[test]
    fn test_config_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.sdk.mode, SdkMode::Sandbox);
        assert_eq!(config.redirect_target, RedirectTarget::Modal);
        assert!(!config.allow_concurrent_attempts);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CheckoutConfig =
            serde_json::from_str(r#"{"sdk": {"mode": "production"}}"#).unwrap();
        assert_eq!(config.sdk.mode, SdkMode::Production);
        assert_eq!(config.redirect_target, RedirectTarget::Modal);
    }
}
