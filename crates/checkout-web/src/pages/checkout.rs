//! Checkout Page

use leptos::prelude::*;

use checkout_core::{FormField, Notice};

use crate::app::SharedOrchestrator;
use crate::components::{FormInput, NoticeBanner};

#[component]
pub fn CheckoutPage(orchestrator: SharedOrchestrator) -> impl IntoView {
    let (notice, set_notice) = signal(None::<Notice>);
    let (busy, set_busy) = signal(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let orchestrator = orchestrator.get_value();
        set_busy.set(true);
        set_notice.set(None);

        leptos::task::spawn_local(async move {
            let outcome = orchestrator.submit().await;
            tracing::debug!(state = ?outcome.state(), "Submission finished");

            let ui = orchestrator.ui_state();
            set_notice.set(ui.notice);
            set_busy.set(ui.busy);
        });
    };

    view! {
        <div class="checkout">
            <h1>"Cashfree Payment Gateway"</h1>
            <div class="card">
                <form class="checkout-form" on:submit=on_submit>
                    {FormField::ALL
                        .into_iter()
                        .map(|field| view! { <FormInput field=field orchestrator=orchestrator /> })
                        .collect_view()}
                    <button type="submit" class="btn btn-primary" disabled=move || busy.get()>
                        {move || if busy.get() { "Processing..." } else { "Pay Now" }}
                    </button>
                </form>
                <NoticeBanner notice=notice />
            </div>
        </div>
    }
}
