//! Checkout Web Frontend
//!
//! Leptos-based WASM form that collects customer details and runs the
//! hosted checkout flow through the Cashfree JS SDK.

mod app;
mod cashfree;
mod components;
mod logging;
mod notify;
mod pages;

pub use app::App;
pub use cashfree::{CashfreeLoader, CashfreeSdk, CASHFREE_SDK_URL};
pub use notify::AlertNotifier;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::DEBUG);
    leptos::mount::mount_to_body(App);
}
