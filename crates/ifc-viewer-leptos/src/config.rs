//! Viewer configuration
//!
//! Defaults, overridden by a JSON object in localStorage, overridden by URL
//! query flags.

use ifc_viewer_parser::LoaderSettings;
use ifc_viewer_scene::camera::{Camera, DEFAULT_EYE, DEFAULT_TARGET};
use ifc_viewer_scene::graph::DEFAULT_MAX_NODES;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// localStorage key holding a JSON [`ViewerConfig`]
pub const CONFIG_KEY: &str = "ifc_viewer_config";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub debug: bool,
    pub coordinate_to_origin: bool,
    pub zoom_to_selection: bool,
    pub element_half_extent: f32,
    pub max_scene_nodes: usize,
    pub camera_eye: [f32; 3],
    pub camera_target: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            coordinate_to_origin: true,
            zoom_to_selection: true,
            element_half_extent: 0.5,
            max_scene_nodes: DEFAULT_MAX_NODES,
            camera_eye: DEFAULT_EYE,
            camera_target: DEFAULT_TARGET,
        }
    }
}

impl ViewerConfig {
    /// Resolve the config for this page load
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(json) = get_storage().and_then(|s| s.get_item(CONFIG_KEY).ok().flatten()) {
            match Self::from_json(&json) {
                Ok(stored) => config = stored,
                // Logger is not installed yet
                Err(e) => web_sys::console::warn_1(&format!("[Config] {e}").into()),
            }
        }

        if let Some(search) = web_sys::window().and_then(|w| w.location().search().ok()) {
            config.apply_query(&search);
        }

        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `debug`, `zoom` and `origin` flags from a query string
    ///
    /// A bare key enables the flag; `0`, `false` and `off` disable it.
    pub fn apply_query(&mut self, search: &str) {
        let query = search.strip_prefix('?').unwrap_or(search);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let Some(flag) = parse_flag(value) else {
                continue;
            };
            match key {
                "debug" => self.debug = flag,
                "zoom" => self.zoom_to_selection = flag,
                "origin" => self.coordinate_to_origin = flag,
                _ => {}
            }
        }
    }

    pub fn loader_settings(&self) -> LoaderSettings {
        LoaderSettings {
            coordinate_to_origin: self.coordinate_to_origin,
            element_half_extent: self.element_half_extent,
        }
    }

    pub fn camera(&self) -> Camera {
        let mut camera = Camera::default();
        camera.set_look_at(self.camera_eye, self.camera_target);
        camera
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Get localStorage
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}
