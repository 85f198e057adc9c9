// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Viewer Model - shared types and seam traits
//!
//! This crate holds the vocabulary the rest of the viewer speaks: decoded IFC
//! entities, the scene node produced by a loader, and the two traits that
//! separate the lifecycle controller from its collaborators.
//!
//! - [`ModelLoader`] - turns raw file bytes into a [`SceneNode`]
//! - [`Scene`] - a scene graph that nodes can be attached to and detached from
//!
//! # Example
//!
//! ```ignore
//! use ifc_viewer_model::{ModelLoader, Scene};
//!
//! let node = loader.load(&bytes, "house.ifc")?;
//! let id = scene.attach(node)?;
//! assert_eq!(scene.node_count(), 1);
//! ```

pub mod error;
pub mod scene;
pub mod traits;
pub mod types;

pub use error::*;
pub use scene::*;
pub use traits::*;
pub use types::*;
