//! Browser Notifier

use checkout_core::Notifier;

/// Shows notifications with `window.alert`
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn notify(&self, message: &str) {
        match web_sys::window() {
            Some(window) => {
                if let Err(err) = window.alert_with_message(message) {
                    tracing::warn!(?err, "alert() failed");
                }
            }
            None => tracing::warn!(notification = message, "No window to alert in"),
        }
    }
}
