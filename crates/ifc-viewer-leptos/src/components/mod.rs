//! UI Components for the IFC viewer

mod contact_form;
mod model_controls;
mod status_bar;
mod viewer_layout;
mod viewport;

pub use contact_form::ContactForm;
pub use model_controls::ModelControls;
pub use status_bar::StatusBar;
pub use viewer_layout::{App, ViewerLayout};
pub use viewport::Viewport;
