// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam traits between the lifecycle controller and its collaborators

use crate::{NodeId, Result, SceneError, SceneNode};

/// Turns raw file bytes into a scene node
///
/// Implementations own format decoding; the caller only sees the finished
/// node or a [`ParseError`](crate::ParseError).
///
/// # Example
///
/// ```ignore
/// let loader = StepLoader::default();
/// let node = loader.load(&bytes, "house.ifc")?;
/// println!("{} elements", node.elements.len());
/// ```
pub trait ModelLoader {
    /// Decode `bytes` into a node named `display_name`
    fn load(&self, bytes: &[u8], display_name: &str) -> Result<SceneNode>;
}

/// A scene graph holding attached model nodes
///
/// The renderer reads the scene every frame; mutation happens only from UI
/// event handlers on the same thread.
pub trait Scene {
    /// Attach a node and return its id
    fn attach(&mut self, node: SceneNode) -> std::result::Result<NodeId, SceneError>;

    /// Detach a node, returning it if it was attached
    fn detach(&mut self, id: NodeId) -> Option<SceneNode>;

    /// Look up an attached node
    fn get(&self, id: NodeId) -> Option<&SceneNode>;

    /// Number of attached nodes
    fn node_count(&self) -> usize;

    fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Whether another [`attach`](Self::attach) would be accepted
    fn has_room(&self) -> bool {
        true
    }
}
