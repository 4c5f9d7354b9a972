//! UI Components

use leptos::prelude::*;

use checkout_core::{FormField, Notice};

use crate::app::SharedOrchestrator;

/// One required form input, writing through to the orchestrator
#[component]
pub fn FormInput(field: FormField, orchestrator: SharedOrchestrator) -> impl IntoView {
    view! {
        <input
            type=field.input_type()
            name=field.as_str()
            placeholder=field.placeholder()
            pattern=field.pattern()
            title=field.title()
            required=true
            class="input"
            on:input=move |ev| {
                let value = event_target_value(&ev);
                orchestrator.with_value(|o| o.update_field(field, value));
            }
        />
    }
}

/// Outcome of the last submission
#[component]
pub fn NoticeBanner(notice: ReadSignal<Option<Notice>>) -> impl IntoView {
    move || {
        notice.get().map(|notice| {
            let class = if notice.is_error() {
                "notice notice-error"
            } else {
                "notice notice-success"
            };
            view! { <p class=class role="status">{notice.message}</p> }
        })
    }
}
