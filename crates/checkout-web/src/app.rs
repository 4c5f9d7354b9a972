//! Main App Component

use std::rc::Rc;

use leptos::prelude::*;

use checkout_core::{CheckoutConfig, CheckoutOrchestrator};
use checkout_runtime::{BackendConfig, HttpPaymentBackend};

use crate::cashfree::CashfreeLoader;
use crate::notify::AlertNotifier;
use crate::pages::CheckoutPage;

/// Orchestrator handle shared by the page's event handlers
pub type SharedOrchestrator = StoredValue<Rc<CheckoutOrchestrator>, LocalStorage>;

/// Backend origin baked in at build time
fn backend_config() -> BackendConfig {
    option_env!("CHECKOUT_API_BASE_URL").map_or_else(BackendConfig::default, BackendConfig::new)
}

fn checkout_config() -> CheckoutConfig {
    let mut config = CheckoutConfig::default();
    if let Some(mode) = option_env!("CHECKOUT_SDK_MODE") {
        match mode.parse() {
            Ok(mode) => config.sdk.mode = mode,
            Err(error) => tracing::warn!(%error, "Ignoring CHECKOUT_SDK_MODE"),
        }
    }
    config
}

fn build_orchestrator() -> checkout_core::Result<CheckoutOrchestrator> {
    let backend = HttpPaymentBackend::new(backend_config())?;

    CheckoutOrchestrator::builder()
        .backend(Rc::new(backend))
        .notifier(Rc::new(AlertNotifier))
        .config(checkout_config())
        .build()
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let orchestrator = match build_orchestrator() {
        Ok(orchestrator) => Rc::new(orchestrator),
        Err(error) => {
            tracing::error!(%error, "Checkout could not start");
            return view! {
                <main class="app">
                    <p class="notice notice-error">{error.user_message()}</p>
                </main>
            }
            .into_any();
        }
    };

    // A failed load is logged by the orchestrator; submissions then end as SdkUnavailable
    let loading = orchestrator.clone();
    leptos::task::spawn_local(async move {
        let _ = loading.initialize_sdk(&CashfreeLoader::default()).await;
    });

    let orchestrator: SharedOrchestrator = StoredValue::new_local(orchestrator);

    view! {
        <main class="app">
            <CheckoutPage orchestrator=orchestrator />
        </main>
    }
    .into_any()
}
