//! Model controls - file input and the load checkbox

use crate::state::{use_viewer_state, ViewerState};
use ifc_viewer_scene::LoadError;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// File picker plus the checkbox that puts the model in the scene
#[component]
pub fn ModelControls() -> impl IntoView {
    let state = use_viewer_state();
    let file_input_ref = NodeRef::<leptos::html::Input>::new();

    let selected_file = move || {
        file_input_ref
            .get_untracked()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
    };

    // The checkbox is usable only while a file is chosen
    let on_file_change = move |_: leptos::ev::Event| {
        let selected = selected_file().is_some();
        state.model.file_selected.set(selected);
        log::debug!("[Controls] File selected: {selected}");
    };

    let on_toggle = move |ev: leptos::ev::Event| {
        let checked = event_target_checked(&ev);
        state.model.load_checked.set(checked);
        match (checked, selected_file()) {
            (true, Some(file)) => load_file(file, state),
            _ => unload_model(state),
        }
    };

    let on_fit = move |_: leptos::ev::MouseEvent| {
        state.update_core(|core| core.fit_all());
    };

    view! {
        <div class="model-controls">
            <label class="control-row">
                <span>"IFC file"</span>
                <input
                    node_ref=file_input_ref
                    id="ifc-file-input"
                    type="file"
                    accept=".ifc"
                    on:change=on_file_change
                />
            </label>
            <label class="control-row">
                <input
                    id="load-ifc-checkbox"
                    type="checkbox"
                    prop:checked=move || state.model.load_checked.get()
                    disabled=move || !state.model.file_selected.get()
                    on:change=on_toggle
                />
                <span>"Show model"</span>
            </label>
            <button
                class="tool-btn"
                on:click=on_fit
                disabled=move || state.model.model_name.get().is_none()
                title="Fit model in view"
            >
                "Fit view"
            </button>
        </div>
    }
}

/// Read a file and load it into the scene
fn load_file(file: web_sys::File, state: ViewerState) {
    let name = file.name();
    let Some(ticket) = state.core.try_update_value(|core| core.begin_load()) else {
        return;
    };

    state.loading.clear_error();
    state.loading.set_loading(true);
    log::info!("[Controls] Loading {name}");

    let file = gloo_file::File::from(file);
    let started = js_sys::Date::now();

    spawn_local(async move {
        let bytes = match gloo_file::futures::read_as_bytes(&file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("[Controls] Failed to read {name}: {e}");
                state.core.update_value(|core| core.cancel_load(ticket));
                state.loading.set_error(format!("Failed to read {name}: {e}"));
                return;
            }
        };
        log::debug!("[Controls] Read {} bytes", bytes.len());

        match state.update_core(|core| core.finish_load(ticket, &bytes, &name)) {
            Some(Ok(handle)) => {
                state.loading.set_loading(false);
                log::info!(
                    "[Controls] IFC model loaded: {} ({}) in {:.0} ms",
                    handle.name,
                    handle.node,
                    js_sys::Date::now() - started
                );
            }
            Some(Err(LoadError::Superseded)) => {
                log::debug!("[Controls] Discarded superseded load of {name}");
            }
            Some(Err(e)) => {
                log::error!("[Controls] Failed to load IFC model {name}: {e}");
                state.loading.set_error(e.to_string());
            }
            None => return,
        }
        state.sync_model();
    });
}

fn unload_model(state: ViewerState) {
    if let Some(Some(handle)) = state.update_core(|core| core.unload()) {
        log::info!("[Controls] IFC model removed from scene: {}", handle.name);
    }
    state.loading.set_loading(false);
    state.model.clear();
    state.selection.clear();
}
