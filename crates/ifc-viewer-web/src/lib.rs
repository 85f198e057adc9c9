//! IFC Viewer web app
//!
//! WASM entry point: installs the panic hook and console logger, resolves the
//! viewer config, and mounts the Leptos app.

use ifc_viewer_leptos::{logging, App, ViewerConfig};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

/// WASM entry point - starts Leptos UI
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = ViewerConfig::load();
    logging::init(config.debug);
    log::info!("[IFC Viewer] Starting v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("[IFC Viewer] Config: {config:?}");

    leptos::mount::mount_to_body(move || view! { <App config=config /> });
}
