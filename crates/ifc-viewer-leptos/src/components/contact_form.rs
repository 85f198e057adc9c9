//! Contact form component

use crate::contact::{self, ContactField};
use leptos::prelude::*;

/// Blocking browser alert
fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Contact form with the download button it unlocks
#[component]
pub fn ContactForm() -> impl IntoView {
    let form = RwSignal::new(contact::ContactForm::default());
    let download_enabled = move || form.with(|f| f.download_enabled);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        match form.try_update(|f| f.submit()) {
            Some(Ok(details)) => {
                log::info!("[Contact] Contact details:");
                log::info!("[Contact] First name: {}", details.first_name);
                log::info!("[Contact] Last name: {}", details.last_name);
                log::info!("[Contact] Phone number: {}", details.phone_number);
                alert("Form submitted!");
            }
            Some(Err(e)) => {
                log::warn!("[Contact] {e}");
                alert("Please fill in all fields.");
            }
            None => {}
        }
    };

    let fields = ContactField::ALL
        .into_iter()
        .map(|field| {
            let input_type = match field {
                ContactField::PhoneNumber => "tel",
                _ => "text",
            };
            view! {
                <label class="form-row">
                    <span>{field.label()}</span>
                    <input
                        id=field.dom_id()
                        type=input_type
                        prop:value=move || form.with(|f| f.value(field).to_string())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            form.update(|f| f.set(field, value));
                        }
                    />
                </label>
            }
        })
        .collect_view();

    view! {
        <form id="contact-form" class="contact-form" on:submit=on_submit>
            {fields}
            <button type="submit" class="submit-btn">"Submit"</button>
            <button
                type="button"
                id="download-data"
                class="download-btn"
                disabled=move || !download_enabled()
                style=move || {
                    if download_enabled() {
                        "background-color: #004080; cursor: pointer;"
                    } else {
                        ""
                    }
                }
            >
                "Download data"
            </button>
        </form>
    }
}
