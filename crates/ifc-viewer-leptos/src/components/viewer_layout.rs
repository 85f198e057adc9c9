//! Main viewer layout - side panel with controls, viewport with status bar

use crate::components::{ContactForm, ModelControls, StatusBar, Viewport};
use crate::config::ViewerConfig;
use crate::state::provide_viewer_state;
use leptos::prelude::*;

/// Main App component - entry point for the viewer
#[component]
pub fn App(config: ViewerConfig) -> impl IntoView {
    // Provide state context to entire app
    provide_viewer_state(config);

    view! {
        <ViewerLayout />
    }
}

/// Main viewer layout component
#[component]
pub fn ViewerLayout() -> impl IntoView {
    view! {
        <div class="viewer-layout">
            <div class="panel panel-left">
                <div class="panel-header">
                    <span class="panel-title">"Model"</span>
                </div>
                <ModelControls />

                <div class="panel-header">
                    <span class="panel-title">"Contact"</span>
                </div>
                <ContactForm />
            </div>

            <div class="viewport-container">
                <Viewport />
                <StatusBar />
            </div>
        </div>
    }
}
