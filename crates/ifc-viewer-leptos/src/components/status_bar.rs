//! Status bar component - loading/error status, model and selection

use crate::state::use_viewer_state;
use leptos::prelude::*;

/// Status bar component
#[component]
pub fn StatusBar() -> impl IntoView {
    let state = use_viewer_state();

    view! {
        <div class="status-bar">
            <div class="status-left">
                {move || {
                    if let Some(err) = state.loading.error.get() {
                        view! { <span class="status-error">{err}</span> }.into_any()
                    } else if state.loading.loading.get() {
                        view! { <span class="status-loading">"Loading..."</span> }.into_any()
                    } else if let Some(name) = state.model.model_name.get() {
                        let count = state.model.element_count.get();
                        view! {
                            <span class="status-ready">{format!("{name}: {count} elements")}</span>
                        }
                        .into_any()
                    } else {
                        view! { <span class="status-idle">"No model loaded"</span> }.into_any()
                    }
                }}
            </div>

            <div class="status-right">
                {move || {
                    let count = state.selection.selected_count.get();
                    match (state.selection.selected_label.get(), count) {
                        (_, 0) => None,
                        (Some(label), 1) => Some(format!("Selected: {label}")),
                        (_, n) => Some(format!("{n} selected")),
                    }
                    .map(|text| view! { <span class="status-selection">{text}</span> })
                }}
            </div>
        </div>
    }
}
