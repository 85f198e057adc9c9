//! Viewer state
//!
//! The scene, camera, selection and lifecycle controller live in one
//! [`ViewerCore`] held by a `StoredValue`; fine-grained signals mirror the
//! parts the UI displays.

use crate::config::ViewerConfig;
use ifc_viewer_model::Scene;
use ifc_viewer_parser::StepLoader;
use ifc_viewer_scene::{
    Camera, Highlighter, Intersection, LoadError, LoadTicket, ModelHandle,
    ModelLifecycleController, SceneGraph,
};
use leptos::prelude::*;

/// Non-reactive viewer data, mutated only from event handlers
pub struct ViewerCore {
    pub scene: SceneGraph,
    pub lifecycle: ModelLifecycleController<StepLoader>,
    pub camera: Camera,
    pub highlighter: Highlighter,
}

impl ViewerCore {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            scene: SceneGraph::with_capacity_limit(config.max_scene_nodes),
            lifecycle: ModelLifecycleController::new(StepLoader::new(config.loader_settings())),
            camera: config.camera(),
            highlighter: Highlighter::new(config.zoom_to_selection),
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.lifecycle.begin_load()
    }

    /// Give up on a load whose bytes never arrived
    pub fn cancel_load(&mut self, ticket: LoadTicket) {
        self.lifecycle.cancel(ticket);
    }

    /// Attach freshly read bytes and frame the result
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        name: &str,
    ) -> Result<ModelHandle, LoadError> {
        let result = self
            .lifecycle
            .load_with_ticket(&mut self.scene, ticket, bytes, name);
        // A failed swap may have reattached the previous model under a new id
        self.highlighter.prune(&self.scene);
        let handle = result?;
        self.fit_all();
        Ok(handle)
    }

    pub fn unload(&mut self) -> Option<ModelHandle> {
        let handle = self.lifecycle.unload(&mut self.scene);
        self.highlighter.prune(&self.scene);
        handle
    }

    /// Pick at a canvas pixel; returns the hit and its display label
    pub fn pick(
        &mut self,
        px: f32,
        py: f32,
        width: f32,
        height: f32,
        additive: bool,
    ) -> Option<(Intersection, String)> {
        let ray = self.camera.ray_through(px, py, width, height);
        let hit = self
            .highlighter
            .pick(&self.scene, &mut self.camera, &ray, additive)?;
        Some((hit, self.label(&hit)))
    }

    /// Update the hovered element; true when it changed
    pub fn hover(&mut self, px: f32, py: f32, width: f32, height: f32) -> bool {
        let before = self.highlighter.hovered();
        let ray = self.camera.ray_through(px, py, width, height);
        self.highlighter.hover(&self.scene, &ray);
        self.highlighter.hovered() != before
    }

    /// Frame everything in the scene
    pub fn fit_all(&mut self) {
        self.camera.fit_bounds(&self.scene.bounds());
    }

    pub fn label(&self, hit: &Intersection) -> String {
        self.scene
            .get(hit.node)
            .and_then(|node| node.element(hit.element))
            .map(|e| e.display_label())
            .unwrap_or_else(|| hit.element.to_string())
    }

    /// Element count of the loaded model
    pub fn element_count(&self) -> usize {
        self.lifecycle
            .current()
            .and_then(|h| self.scene.get(h.node))
            .map_or(0, |node| node.elements.len())
    }
}

/// Loading/error signals
#[derive(Clone, Copy)]
pub struct LoadingState {
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
}

impl LoadingState {
    pub fn new() -> Self {
        Self {
            loading: RwSignal::new(false),
            error: RwSignal::new(None),
        }
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    pub fn set_error(&self, error: String) {
        self.error.set(Some(error));
        self.loading.set(false);
    }

    pub fn clear_error(&self) {
        self.error.set(None);
    }
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Model control signals
#[derive(Clone, Copy)]
pub struct ModelState {
    /// A file is chosen in the file input
    pub file_selected: RwSignal<bool>,
    /// The load checkbox is ticked
    pub load_checked: RwSignal<bool>,
    pub model_name: RwSignal<Option<String>>,
    pub element_count: RwSignal<usize>,
}

impl ModelState {
    pub fn new() -> Self {
        Self {
            file_selected: RwSignal::new(false),
            load_checked: RwSignal::new(false),
            model_name: RwSignal::new(None),
            element_count: RwSignal::new(0),
        }
    }

    pub fn clear(&self) {
        self.model_name.set(None);
        self.element_count.set(0);
    }
}

impl Default for ModelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Selection signals
#[derive(Clone, Copy)]
pub struct SelectionState {
    pub selected_label: RwSignal<Option<String>>,
    pub selected_count: RwSignal<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            selected_label: RwSignal::new(None),
            selected_count: RwSignal::new(0),
        }
    }

    pub fn clear(&self) {
        self.selected_label.set(None);
        self.selected_count.set(0);
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Combined viewer state
#[derive(Clone, Copy)]
pub struct ViewerState {
    pub config: StoredValue<ViewerConfig>,
    pub core: StoredValue<ViewerCore>,
    pub loading: LoadingState,
    pub model: ModelState,
    pub selection: SelectionState,
    /// Bumped after every core mutation so the viewport redraws
    pub redraw: RwSignal<u64>,
}

impl ViewerState {
    pub fn new(config: ViewerConfig) -> Self {
        let core = ViewerCore::new(&config);
        Self {
            config: StoredValue::new(config),
            core: StoredValue::new(core),
            loading: LoadingState::new(),
            model: ModelState::new(),
            selection: SelectionState::new(),
            redraw: RwSignal::new(0),
        }
    }

    /// Mutate the core and schedule a redraw
    pub fn update_core<R>(&self, f: impl FnOnce(&mut ViewerCore) -> R) -> Option<R> {
        let result = self.core.try_update_value(f);
        self.redraw.update(|n| *n += 1);
        result
    }

    /// Refresh model signals from the core
    pub fn sync_model(&self) {
        let (name, count, selected) = self.core.with_value(|core| {
            (
                core.lifecycle.current().map(|h| h.name.clone()),
                core.element_count(),
                core.highlighter.selection_len(),
            )
        });
        self.model.model_name.set(name);
        self.model.element_count.set(count);
        self.selection.selected_count.set(selected);
        if selected == 0 {
            self.selection.selected_label.set(None);
        }
    }
}

/// Provide viewer state to the component tree
pub fn provide_viewer_state(config: ViewerConfig) {
    provide_context(ViewerState::new(config));
}

/// Hook to access viewer state from context
pub fn use_viewer_state() -> ViewerState {
    expect_context::<ViewerState>()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#10=IFCCARTESIANPOINT((0.,0.,0.));\n\
#11=IFCAXIS2PLACEMENT3D(#10,$,$);\n\
#12=IFCLOCALPLACEMENT($,#11);\n\
#20=IFCCOLUMN('c',$,'Column A',$,$,#12,$,$,$);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    fn core() -> ViewerCore {
        ViewerCore::new(&ViewerConfig::default())
    }

    #[test]
    fn test_load_then_pick_centre() {
        let mut core = core();
        let ticket = core.begin_load();
        core.finish_load(ticket, MODEL.as_bytes(), "column.ifc").unwrap();
        assert_eq!(core.element_count(), 1);

        // Camera is framed on the model, so the centre pixel hits it
        let (hit, label) = core.pick(400.0, 300.0, 800.0, 600.0, false).unwrap();
        assert_eq!(label, "Column A");
        assert!(core.highlighter.is_selected(hit.node, hit.element));
    }

    #[test]
    fn test_unload_clears_selection() {
        let mut core = core();
        let ticket = core.begin_load();
        core.finish_load(ticket, MODEL.as_bytes(), "column.ifc").unwrap();
        core.pick(400.0, 300.0, 800.0, 600.0, false).unwrap();

        assert!(core.unload().is_some());
        assert_eq!(core.highlighter.selection_len(), 0);
        assert_eq!(core.element_count(), 0);
        assert!(core.unload().is_none());
    }

    #[test]
    fn test_hover_reports_changes() {
        let mut core = core();
        let ticket = core.begin_load();
        core.finish_load(ticket, MODEL.as_bytes(), "column.ifc").unwrap();

        assert!(core.hover(400.0, 300.0, 800.0, 600.0));
        assert!(!core.hover(400.0, 300.0, 800.0, 600.0));
        assert!(core.hover(0.0, 0.0, 800.0, 600.0));
        assert!(core.highlighter.hovered().is_none());
    }

    #[test]
    fn test_stale_ticket_after_unload() {
        let mut core = core();
        let ticket = core.begin_load();
        core.unload();
        assert!(matches!(
            core.finish_load(ticket, MODEL.as_bytes(), "column.ifc"),
            Err(LoadError::Superseded)
        ));
        assert_eq!(core.scene.node_count(), 0);
    }

    #[test]
    fn test_cancelled_read_is_not_loading() {
        let mut core = core();
        let ticket = core.begin_load();
        assert!(core.lifecycle.is_loading());

        core.cancel_load(ticket);
        assert!(!core.lifecycle.is_loading());
        assert!(matches!(
            core.finish_load(ticket, MODEL.as_bytes(), "column.ifc"),
            Err(LoadError::Superseded)
        ));
    }

    #[test]
    fn test_reload_with_single_node_limit() {
        let config = ViewerConfig {
            max_scene_nodes: 1,
            ..ViewerConfig::default()
        };
        let mut core = ViewerCore::new(&config);
        for name in ["a.ifc", "b.ifc"] {
            let ticket = core.begin_load();
            core.finish_load(ticket, MODEL.as_bytes(), name).unwrap();
        }
        assert_eq!(core.scene.node_count(), 1);
        assert_eq!(core.element_count(), 1);
    }
}
