// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory scene graph

use ifc_viewer_model::{Aabb, NodeId, Scene, SceneError, SceneNode};

/// Default limit on attached nodes
pub const DEFAULT_MAX_NODES: usize = 16;

/// Flat list of attached model nodes
///
/// Node ids are never reused. `version` increases on every mutation so a
/// renderer can tell when to redraw.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<(NodeId, SceneNode)>,
    next_id: u64,
    version: u64,
    max_nodes: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::with_capacity_limit(DEFAULT_MAX_NODES)
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(max_nodes: usize) -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 1,
            version: 0,
            max_nodes,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Union of all attached node bounds
    pub fn bounds(&self) -> Aabb {
        self.nodes
            .iter()
            .fold(Aabb::empty(), |acc, (_, node)| acc.union(&node.bounds))
    }

    /// Total elements across attached nodes
    pub fn element_count(&self) -> usize {
        self.nodes.iter().map(|(_, n)| n.elements.len()).sum()
    }
}

impl Scene for SceneGraph {
    fn attach(&mut self, node: SceneNode) -> Result<NodeId, SceneError> {
        if self.nodes.len() >= self.max_nodes {
            return Err(SceneError::Capacity {
                limit: self.max_nodes,
            });
        }

        let id = NodeId(self.next_id);
        self.next_id += 1;
        log::debug!("[Scene] Attach {} as {}", node.name, id);
        self.nodes.push((id, node));
        self.version += 1;
        Ok(id)
    }

    fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        let pos = self.nodes.iter().position(|(n, _)| *n == id)?;
        let (_, node) = self.nodes.remove(pos);
        log::debug!("[Scene] Detach {} ({})", id, node.name);
        self.version += 1;
        Some(node)
    }

    fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|(n, _)| *n == id).map(|(_, node)| node)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn has_room(&self) -> bool {
        self.nodes.len() < self.max_nodes
    }
}
