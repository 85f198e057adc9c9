// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Viewer Scene
//!
//! The data side of the viewport: an in-memory scene graph, a look-at
//! camera, ray picking, and the controller that owns the loaded model.

pub mod camera;
pub mod graph;
pub mod lifecycle;
pub mod picking;

pub use camera::{Camera, Ray};
pub use graph::SceneGraph;
pub use lifecycle::{LoadError, LoadTicket, ModelHandle, ModelLifecycleController};
pub use picking::{Highlighter, Intersection};
