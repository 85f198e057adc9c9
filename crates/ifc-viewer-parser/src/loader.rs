// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bytes → scene node

use crate::decoder::EntityDecoder;
use crate::placement::PlacementResolver;
use crate::scanner::{parse_header, HeaderInfo};
use crate::units::extract_unit_scale;
use ifc_viewer_model::{
    Aabb, DecodedEntity, ModelLoader, ParseError, Result, SceneElement, SceneNode,
};
use serde::{Deserialize, Serialize};

/// Schema prefixes the loader accepts
const SUPPORTED_SCHEMAS: &[&str] = &["IFC2X3", "IFC4X1", "IFC4X2", "IFC4X3", "IFC4"];

/// Loader behaviour switches
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Move the model so its bounds centre sits at the scene origin
    pub coordinate_to_origin: bool,
    /// Half edge length of the box drawn for each element, in metres
    pub element_half_extent: f32,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            coordinate_to_origin: true,
            element_half_extent: 0.5,
        }
    }
}

/// STEP/IFC implementation of [`ModelLoader`]
#[derive(Clone, Debug, Default)]
pub struct StepLoader {
    pub settings: LoaderSettings,
}

impl StepLoader {
    pub fn new(settings: LoaderSettings) -> Self {
        Self { settings }
    }

    /// Decode already-validated text
    pub fn load_str(&self, content: &str, display_name: &str) -> Result<SceneNode> {
        let header = parse_header(content)?;
        log::debug!("[Loader] Header: {header:?}");
        check_schema(&header)?;

        if !content.contains("DATA;") {
            return Err(ParseError::format("missing DATA section"));
        }

        let mut decoder = EntityDecoder::new(content);
        if decoder.entity_count() == 0 {
            return Err(ParseError::format("DATA section holds no entities"));
        }

        let scale = extract_unit_scale(&mut decoder);
        let mut placements = PlacementResolver::new();
        let half = self.settings.element_half_extent;

        let mut elements = Vec::new();
        for id in decoder.ids_where(|t| t.is_element()) {
            let Some(entity) = decoder.get(id) else {
                continue;
            };

            // IfcProduct.ObjectPlacement
            let origin = entity
                .get_ref(5)
                .and_then(|p| placements.resolve_origin(p, &mut decoder));
            let Some(origin) = origin else {
                log::debug!("[Loader] {} {} has no placement", entity.ifc_type, id);
                continue;
            };

            let center = to_viewer_space([origin.x, origin.y, origin.z], scale);
            elements.push(scene_element(&entity, Aabb::around(center, half)));
        }

        let mut node = SceneNode::new(display_name, header.schema_version.clone(), elements)
            .with_entity_count(decoder.entity_count());

        if self.settings.coordinate_to_origin && !node.bounds.is_empty() {
            center_on_origin(&mut node);
        }

        log::info!(
            "[Loader] {}: {} elements from {} entities ({}, unit scale {})",
            display_name,
            node.elements.len(),
            node.entity_count,
            header.schema_version,
            scale
        );

        Ok(node)
    }
}

impl ModelLoader for StepLoader {
    fn load(&self, bytes: &[u8], display_name: &str) -> Result<SceneNode> {
        let content = std::str::from_utf8(bytes)?;
        self.load_str(content, display_name)
    }
}

fn check_schema(header: &HeaderInfo) -> Result<()> {
    let schema = header.schema_version.to_ascii_uppercase();
    if SUPPORTED_SCHEMAS.iter().any(|s| schema.starts_with(s)) {
        Ok(())
    } else {
        Err(ParseError::UnsupportedSchema(header.schema_version.clone()))
    }
}

/// IFC is Z-up in file units; the viewer is Y-up in metres
fn to_viewer_space(p: [f64; 3], scale: f64) -> [f32; 3] {
    [
        (p[0] * scale) as f32,
        (p[2] * scale) as f32,
        (-p[1] * scale) as f32,
    ]
}

fn scene_element(entity: &DecodedEntity, bounds: Aabb) -> SceneElement {
    SceneElement {
        id: entity.id,
        ifc_type: entity.ifc_type.clone(),
        global_id: entity.get_string(0).map(str::to_string),
        name: entity.get_string(2).map(str::to_string),
        bounds,
    }
}

fn center_on_origin(node: &mut SceneNode) {
    let c = node.bounds.center();
    let offset = [-c[0], -c[1], -c[2]];
    for element in &mut node.elements {
        element.bounds = element.bounds.translated(offset);
    }
    node.bounds = node.bounds.translated(offset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_viewer_model::{EntityId, IfcType};

    pub(crate) const HOUSE: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('house.ifc','2024-05-01T10:00:00',('Architect'),('Studio'),'Exporter','Modeller','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0YvctVUKr0kugbFTf53O9L',$,'House',$,$,$,$,$,#2);
#2=IFCUNITASSIGNMENT((#3));
#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#10=IFCCARTESIANPOINT((0.,0.,0.));
#11=IFCAXIS2PLACEMENT3D(#10,$,$);
#12=IFCLOCALPLACEMENT($,#11);
#20=IFCCARTESIANPOINT((4000.,2000.,0.));
#21=IFCAXIS2PLACEMENT3D(#20,$,$);
#22=IFCLOCALPLACEMENT(#12,#21);
#30=IFCCARTESIANPOINT((0.,0.,3000.));
#31=IFCAXIS2PLACEMENT3D(#30,$,$);
#32=IFCLOCALPLACEMENT(#22,#31);
#100=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall 1',$,$,#12,$,$,$);
#101=IFCDOOR('1hOSvn6df7F8_7GcBWlRGQ',$,'Door',$,$,#22,$,$,$,$,$);
#102=IFCSLAB('3a4T3gSbH7D8uXw_mEwr5Y',$,$,$,$,#32,$,$,$);
#103=IFCWINDOW('0x9zSfEo5DZ9A8_1lmRKu7',$,'Floating',$,$,$,$,$,$,$,$);
#104=IFCOPENINGELEMENT('3Hu7fVnPb1E9vT8W1UxDQq',$,'Opening',$,$,#12,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    fn loader() -> StepLoader {
        StepLoader::new(LoaderSettings {
            coordinate_to_origin: false,
            element_half_extent: 0.25,
        })
    }

    #[test]
    fn test_load_places_elements() {
        let node = loader().load(HOUSE.as_bytes(), "house.ifc").unwrap();

        assert_eq!(node.name, "house.ifc");
        assert_eq!(node.schema, "IFC4");
        assert_eq!(node.entity_count, 17);

        // Wall, door and slab have placements; the window has none and the
        // opening is not a visible element
        let ids: Vec<EntityId> = node.elements.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EntityId(100), EntityId(101), EntityId(102)]);

        let door = node.element(EntityId(101)).unwrap();
        assert_eq!(door.ifc_type, IfcType::IfcDoor);
        assert_eq!(door.name.as_deref(), Some("Door"));
        assert_eq!(door.global_id.as_deref(), Some("1hOSvn6df7F8_7GcBWlRGQ"));
        // (4m, 2m, 0) in IFC Z-up becomes (4, 0, -2) in Y-up
        assert_eq!(door.bounds.center(), [4.0, 0.0, -2.0]);

        let slab = node.element(EntityId(102)).unwrap();
        assert_eq!(slab.name, None);
        assert_eq!(slab.bounds.center(), [4.0, 3.0, -2.0]);
    }

    #[test]
    fn test_coordinate_to_origin_centres_bounds() {
        let node = StepLoader::default()
            .load(HOUSE.as_bytes(), "house.ifc")
            .unwrap();
        let c = node.bounds.center();
        for axis in c {
            assert!(axis.abs() < 1e-5, "bounds centre {c:?} not at origin");
        }
    }

    #[test]
    fn test_rejects_malformed_bytes() {
        let err = loader().load(b"this is not an ifc file", "junk.ifc").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));

        let err = loader().load(&[0xff, 0xfe, 0xfd], "binary.ifc").unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
    }

    #[test]
    fn test_rejects_unsupported_schema() {
        let text = HOUSE.replace("'IFC4'", "'CONFIG_CONTROL_DESIGN'");
        let err = loader().load(text.as_bytes(), "part.stp").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedSchema(ref s) if s == "CONFIG_CONTROL_DESIGN"
        ));
    }

    #[test]
    fn test_rejects_empty_data_section() {
        let text = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC2X3'));\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;\n";
        let err = loader().load(text.as_bytes(), "empty.ifc").unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));
    }

    #[test]
    fn test_cyclic_unit_definition_still_loads() {
        let text = HOUSE.replace(
            "#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);",
            "#3=IFCCONVERSIONBASEDUNIT(*,.LENGTHUNIT.,'FOOT',#4);\n\
#4=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(0.3048),#3);",
        );
        let node = loader().load(text.as_bytes(), "loop.ifc").unwrap();
        assert_eq!(node.elements.len(), 3);
    }

    #[test]
    fn test_model_without_elements_still_loads() {
        let text = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC2X3'));\nENDSEC;\nDATA;\n#1=IFCPROJECT('p',$,'P',$,$,$,$,$,$);\nENDSEC;\nEND-ISO-10303-21;\n";
        let node = StepLoader::default().load(text.as_bytes(), "bare.ifc").unwrap();
        assert!(node.elements.is_empty());
        assert!(node.bounds.is_empty());
    }
}
