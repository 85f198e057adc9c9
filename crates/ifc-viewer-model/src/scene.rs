// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene-side representation of a loaded model
//!
//! Coordinates are in viewer space: Y-up, metres.

use crate::{EntityId, IfcType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Cube of the given half extent around a centre point
    pub fn around(center: [f32; 3], half_extent: f32) -> Self {
        Self {
            min: [
                center[0] - half_extent,
                center[1] - half_extent,
                center[2] - half_extent,
            ],
            max: [
                center[0] + half_extent,
                center[1] + half_extent,
                center[2] + half_extent,
            ],
        }
    }

    /// Inverted box that any `union` replaces
    pub fn empty() -> Self {
        Self {
            min: [f32::MAX; 3],
            max: [f32::MIN; 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn translated(&self, offset: [f32; 3]) -> Aabb {
        Aabb {
            min: [
                self.min[0] + offset[0],
                self.min[1] + offset[1],
                self.min[2] + offset[2],
            ],
            max: [
                self.max[0] + offset[0],
                self.max[1] + offset[1],
                self.max[2] + offset[2],
            ],
        }
    }

    /// The eight corners, min corner first
    pub fn corners(&self) -> [[f32; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [b[0], b[1], b[2]],
            [a[0], b[1], b[2]],
        ]
    }
}

/// Identifier issued by a scene when a node is attached
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// One placed IFC product
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: EntityId,
    pub ifc_type: IfcType,
    pub global_id: Option<String>,
    pub name: Option<String>,
    pub bounds: Aabb,
}

impl SceneElement {
    /// Name if present, otherwise type and id
    pub fn display_label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.ifc_type, self.id),
        }
    }
}

/// A parsed model ready to be attached to a scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Display name, usually the file name
    pub name: String,
    /// Schema identifier from the file header (e.g. IFC4)
    pub schema: String,
    /// Number of entities in the source file
    pub entity_count: usize,
    pub elements: Vec<SceneElement>,
    pub bounds: Aabb,
}

impl SceneNode {
    /// Build a node and compute its bounds from the elements
    pub fn new(
        name: impl Into<String>,
        schema: impl Into<String>,
        elements: Vec<SceneElement>,
    ) -> Self {
        let bounds = elements
            .iter()
            .fold(Aabb::empty(), |acc, e| acc.union(&e.bounds));
        Self {
            name: name.into(),
            schema: schema.into(),
            entity_count: 0,
            elements,
            bounds,
        }
    }

    pub fn with_entity_count(mut self, count: usize) -> Self {
        self.entity_count = count;
        self
    }

    pub fn element(&self, id: EntityId) -> Option<&SceneElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}
