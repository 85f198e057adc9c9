// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model lifecycle
//!
//! Owns the single loaded model: parses bytes through a [`ModelLoader`],
//! attaches the result to a [`Scene`], and detaches it again on unload.

use ifc_viewer_model::{ModelLoader, NodeId, ParseError, Scene, SceneError, SceneNode};
use thiserror::Error;

/// Why a load did not produce a model
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to parse model: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to attach model: {0}")]
    Attach(#[from] SceneError),

    #[error("Load was superseded by a newer request")]
    Superseded,
}

/// A model currently attached to the scene
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelHandle {
    pub node: NodeId,
    pub name: String,
}

/// Generation issued when a load begins
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Tracks at most one loaded model
pub struct ModelLifecycleController<L> {
    loader: L,
    loaded: Option<ModelHandle>,
    generation: u64,
    pending: Option<LoadTicket>,
}

impl<L: ModelLoader> ModelLifecycleController<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            loaded: None,
            generation: 0,
            pending: None,
        }
    }

    pub fn current(&self) -> Option<&ModelHandle> {
        self.loaded.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// A ticket has been issued and not yet consumed or invalidated
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a load; any earlier outstanding ticket becomes stale
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket(self.generation);
        self.pending = Some(ticket);
        ticket
    }

    /// Drop an outstanding ticket without loading anything
    ///
    /// Returns false when the ticket was already stale.
    pub fn cancel(&mut self, ticket: LoadTicket) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Parse `bytes` and make the result the loaded model
    pub fn load<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<ModelHandle, LoadError> {
        let ticket = self.begin_load();
        self.load_with_ticket(scene, ticket, bytes, display_name)
    }

    /// Finish a load started with [`begin_load`](Self::begin_load)
    ///
    /// The ticket is consumed whatever the outcome. On any error the
    /// previously loaded model stays in the scene. When the scene is full it
    /// is detached before the new node goes in, and reattached (under a new
    /// node id) if that attach fails.
    pub fn load_with_ticket<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        ticket: LoadTicket,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<ModelHandle, LoadError> {
        if self.pending != Some(ticket) {
            log::debug!("[Lifecycle] Dropping stale load of {display_name}");
            return Err(LoadError::Superseded);
        }
        self.pending = None;

        let node = self.loader.load(bytes, display_name)?;
        let id = match self.loaded.take() {
            None => scene.attach(node)?,
            Some(previous) if scene.has_room() => {
                let id = scene.attach(node).inspect_err(|_| {
                    self.loaded = Some(previous.clone());
                })?;
                scene.detach(previous.node);
                log::info!("[Lifecycle] Replaced {} ({})", previous.name, previous.node);
                id
            }
            Some(previous) => self.swap_in_full_scene(scene, previous, node)?,
        };

        let handle = ModelHandle {
            node: id,
            name: display_name.to_string(),
        };
        log::info!("[Lifecycle] Loaded {} as {}", handle.name, handle.node);
        self.loaded = Some(handle.clone());
        Ok(handle)
    }

    fn swap_in_full_scene<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        previous: ModelHandle,
        node: SceneNode,
    ) -> Result<NodeId, LoadError> {
        let old_node = scene.detach(previous.node);
        let err = match scene.attach(node) {
            Ok(id) => {
                log::info!("[Lifecycle] Replaced {} ({})", previous.name, previous.node);
                return Ok(id);
            }
            Err(err) => err,
        };

        match old_node.map(|old| scene.attach(old)) {
            Some(Ok(node)) => {
                self.loaded = Some(ModelHandle {
                    node,
                    name: previous.name,
                });
            }
            Some(Err(e)) => {
                log::error!("[Lifecycle] Could not restore {}: {e}", previous.name);
            }
            None => {}
        }
        Err(err.into())
    }

    /// Detach the loaded model, if any, and cancel an in-flight load
    ///
    /// Returns the handle that was detached.
    pub fn unload<S: Scene + ?Sized>(&mut self, scene: &mut S) -> Option<ModelHandle> {
        self.pending = None;
        let handle = self.loaded.take()?;
        scene.detach(handle.node);
        log::info!("[Lifecycle] Unloaded {} ({})", handle.name, handle.node);
        Some(handle)
    }
}
