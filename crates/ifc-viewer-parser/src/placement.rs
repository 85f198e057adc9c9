// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Object placement resolution
//!
//! Turns an `IfcLocalPlacement` chain into a world transform.

use crate::decoder::EntityDecoder;
use ifc_viewer_model::{EntityId, IfcType};
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;

/// Placement chains deeper than this are treated as cyclic
const MAX_PLACEMENT_DEPTH: usize = 64;

/// Resolves placements to world transforms, caching every chain link
#[derive(Default)]
pub struct PlacementResolver {
    cache: FxHashMap<u32, Matrix4<f64>>,
}

impl PlacementResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// World transform of an `IfcLocalPlacement` (or bare axis placement)
    pub fn resolve(
        &mut self,
        placement_id: EntityId,
        decoder: &mut EntityDecoder<'_>,
    ) -> Option<Matrix4<f64>> {
        self.resolve_at_depth(placement_id, decoder, 0)
    }

    /// World position of the placement origin
    pub fn resolve_origin(
        &mut self,
        placement_id: EntityId,
        decoder: &mut EntityDecoder<'_>,
    ) -> Option<Point3<f64>> {
        let matrix = self.resolve(placement_id, decoder)?;
        Some(matrix.transform_point(&Point3::origin()))
    }

    fn resolve_at_depth(
        &mut self,
        placement_id: EntityId,
        decoder: &mut EntityDecoder<'_>,
        depth: usize,
    ) -> Option<Matrix4<f64>> {
        if depth > MAX_PLACEMENT_DEPTH {
            log::warn!("[Placement] Chain at {placement_id} is too deep, ignoring parent");
            return None;
        }
        if let Some(cached) = self.cache.get(&placement_id.0) {
            return Some(*cached);
        }

        let placement = decoder.get(placement_id)?;
        let matrix = match placement.ifc_type {
            // IFCLOCALPLACEMENT(PlacementRelTo, RelativePlacement)
            IfcType::IfcLocalPlacement => {
                let local = placement
                    .get_ref(1)
                    .and_then(|id| axis_placement(id, decoder))
                    .unwrap_or_else(Matrix4::identity);
                let parent = placement
                    .get_ref(0)
                    .and_then(|id| self.resolve_at_depth(id, decoder, depth + 1))
                    .unwrap_or_else(Matrix4::identity);
                parent * local
            }
            IfcType::IfcAxis2Placement3D => axis_placement(placement_id, decoder)?,
            _ => return None,
        };

        self.cache.insert(placement_id.0, matrix);
        Some(matrix)
    }
}

/// IFCAXIS2PLACEMENT3D(Location, Axis, RefDirection) as a matrix
fn axis_placement(id: EntityId, decoder: &mut EntityDecoder<'_>) -> Option<Matrix4<f64>> {
    let placement = decoder.get(id)?;
    if placement.ifc_type != IfcType::IfcAxis2Placement3D {
        return None;
    }

    let location = placement
        .get_ref(0)
        .and_then(|id| cartesian_point(id, decoder))
        .unwrap_or_else(Point3::origin);
    let axis = placement
        .get_ref(1)
        .and_then(|id| direction(id, decoder))
        .unwrap_or_else(Vector3::z);
    let ref_dir = placement
        .get_ref(2)
        .and_then(|id| direction(id, decoder))
        .unwrap_or_else(Vector3::x);

    let z = axis.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z);
    let y = z
        .cross(&ref_dir)
        .try_normalize(f64::EPSILON)
        .unwrap_or_else(|| z.cross(&Vector3::x()).normalize());
    let x = y.cross(&z).normalize();

    Some(Matrix4::new(
        x.x, y.x, z.x, location.x,
        x.y, y.y, z.y, location.y,
        x.z, y.z, z.z, location.z,
        0.0, 0.0, 0.0, 1.0,
    ))
}

/// IFCCARTESIANPOINT((x, y, z)); 2D points get z = 0
fn cartesian_point(id: EntityId, decoder: &mut EntityDecoder<'_>) -> Option<Point3<f64>> {
    let point = decoder.get(id)?;
    if point.ifc_type != IfcType::IfcCartesianPoint {
        return None;
    }
    let coords = point.get_list(0)?;
    let c = |i: usize| coords.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
    Some(Point3::new(c(0), c(1), c(2)))
}

/// IFCDIRECTION((x, y, z))
fn direction(id: EntityId, decoder: &mut EntityDecoder<'_>) -> Option<Vector3<f64>> {
    let dir = decoder.get(id)?;
    if dir.ifc_type != IfcType::IfcDirection {
        return None;
    }
    let ratios = dir.get_list(0)?;
    let c = |i: usize| ratios.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
    Some(Vector3::new(c(0), c(1), c(2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CONTENT: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#10=IFCCARTESIANPOINT((0.,0.,0.));\n\
#11=IFCAXIS2PLACEMENT3D(#10,$,$);\n\
#12=IFCLOCALPLACEMENT($,#11);\n\
#20=IFCCARTESIANPOINT((10.,0.,3.));\n\
#21=IFCAXIS2PLACEMENT3D(#20,$,$);\n\
#22=IFCLOCALPLACEMENT(#12,#21);\n\
#30=IFCCARTESIANPOINT((2.,0.,0.));\n\
#31=IFCDIRECTION((0.,0.,1.));\n\
#32=IFCDIRECTION((0.,1.,0.));\n\
#33=IFCAXIS2PLACEMENT3D(#30,#31,#32);\n\
#34=IFCLOCALPLACEMENT(#22,#33);\n\
#40=IFCLOCALPLACEMENT(#41,#11);\n\
#41=IFCLOCALPLACEMENT(#40,#11);\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_chained_translation() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let mut resolver = PlacementResolver::new();
        let origin = resolver.resolve_origin(EntityId(22), &mut decoder).unwrap();
        assert_relative_eq!(origin, Point3::new(10.0, 0.0, 3.0));
    }

    #[test]
    fn test_rotated_child_placement() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let mut resolver = PlacementResolver::new();

        // Child X axis points along world Y
        let matrix = resolver.resolve(EntityId(34), &mut decoder).unwrap();
        let origin = matrix.transform_point(&Point3::origin());
        assert_relative_eq!(origin, Point3::new(12.0, 0.0, 3.0));
        let unit_x = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(unit_x, Point3::new(12.0, 1.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_cyclic_chain_terminates() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let mut resolver = PlacementResolver::new();
        let origin = resolver.resolve_origin(EntityId(40), &mut decoder);
        assert_relative_eq!(origin.unwrap(), Point3::origin());
    }

    #[test]
    fn test_non_placement_is_none() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let mut resolver = PlacementResolver::new();
        assert!(resolver.resolve(EntityId(10), &mut decoder).is_none());
        assert!(resolver.resolve(EntityId(999), &mut decoder).is_none());
    }
}
