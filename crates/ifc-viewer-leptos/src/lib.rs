//! IFC Viewer Leptos UI Components
//!
//! Reactive UI for the IFC viewer: model controls, a canvas viewport with
//! picking, and the contact form.

pub mod components;
pub mod config;
pub mod contact;
pub mod logging;
pub mod renderer;
pub mod state;

// Re-exports
pub use components::{App, ViewerLayout};
pub use config::{ConfigError, ViewerConfig, CONFIG_KEY};
pub use contact::{ContactDetails, ContactField, ContactForm, ValidationError};
pub use state::{provide_viewer_state, use_viewer_state, ViewerCore, ViewerState};
