// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray picking and selection highlighting

use crate::camera::{Camera, Ray};
use crate::graph::SceneGraph;
use ifc_viewer_model::{Aabb, EntityId, NodeId, Scene};
use rustc_hash::FxHashSet;

/// Element hit by a picking ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub element: EntityId,
    pub distance: f32,
}

/// Selection and hover state over a scene
#[derive(Debug)]
pub struct Highlighter {
    /// Frame the camera on the element after a click
    pub zoom_to_selection: bool,
    selected: FxHashSet<(NodeId, EntityId)>,
    hovered: Option<(NodeId, EntityId)>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self {
            zoom_to_selection: true,
            selected: FxHashSet::default(),
            hovered: None,
        }
    }
}

impl Highlighter {
    pub fn new(zoom_to_selection: bool) -> Self {
        Self {
            zoom_to_selection,
            ..Self::default()
        }
    }

    /// All elements the ray passes through, nearest first
    pub fn intersect(scene: &SceneGraph, ray: &Ray) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = scene
            .iter()
            .filter(|(_, node)| ray.intersect_aabb(&node.bounds).is_some())
            .flat_map(|(node_id, node)| {
                node.elements.iter().filter_map(move |element| {
                    ray.intersect_aabb(&element.bounds)
                        .map(|distance| Intersection {
                            node: node_id,
                            element: element.id,
                            distance,
                        })
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Handle a click: select the nearest hit (or clear on a miss) and
    /// optionally frame it
    ///
    /// With `additive` the hit is toggled into the existing selection.
    pub fn pick(
        &mut self,
        scene: &SceneGraph,
        camera: &mut Camera,
        ray: &Ray,
        additive: bool,
    ) -> Option<Intersection> {
        let hit = Self::intersect(scene, ray).into_iter().next();

        match hit {
            Some(hit) => {
                if additive {
                    self.toggle(hit.node, hit.element);
                } else {
                    self.select(hit.node, hit.element);
                }
                log::debug!("[Picking] Hit {} in {} at {:.2}", hit.element, hit.node, hit.distance);
                if self.zoom_to_selection {
                    self.zoom_to_selection(scene, camera);
                }
            }
            None if !additive => self.clear(),
            None => {}
        }

        hit
    }

    /// Track the element under the cursor
    pub fn hover(&mut self, scene: &SceneGraph, ray: &Ray) -> Option<Intersection> {
        let hit = Self::intersect(scene, ray).into_iter().next();
        self.hovered = hit.map(|h| (h.node, h.element));
        hit
    }

    pub fn hovered(&self) -> Option<(NodeId, EntityId)> {
        self.hovered
    }

    pub fn is_selected(&self, node: NodeId, element: EntityId) -> bool {
        self.selected.contains(&(node, element))
    }

    /// Select a single element (clears previous selection)
    pub fn select(&mut self, node: NodeId, element: EntityId) {
        self.selected.clear();
        self.selected.insert((node, element));
    }

    pub fn toggle(&mut self, node: NodeId, element: EntityId) {
        if !self.selected.remove(&(node, element)) {
            self.selected.insert((node, element));
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Selected elements, sorted for stable display
    pub fn selection(&self) -> Vec<(NodeId, EntityId)> {
        let mut items: Vec<_> = self.selected.iter().copied().collect();
        items.sort_unstable();
        items
    }

    /// Forget selections and hover on nodes no longer in the scene
    pub fn prune(&mut self, scene: &SceneGraph) {
        self.selected.retain(|(node, _)| scene.contains(*node));
        if self.hovered.is_some_and(|(node, _)| !scene.contains(node)) {
            self.hovered = None;
        }
    }

    /// Union of the selected elements' bounds
    pub fn selection_bounds(&self, scene: &SceneGraph) -> Aabb {
        self.selected
            .iter()
            .filter_map(|(node, element)| scene.get(*node)?.element(*element))
            .fold(Aabb::empty(), |acc, e| acc.union(&e.bounds))
    }

    /// Frame the camera on the current selection
    pub fn zoom_to_selection(&self, scene: &SceneGraph, camera: &mut Camera) {
        camera.fit_bounds(&self.selection_bounds(scene));
    }
}
