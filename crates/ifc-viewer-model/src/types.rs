// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for decoded IFC data

use serde::{Deserialize, Serialize};
use std::fmt;

/// STEP instance name, the number after `#`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

/// Declares [`IfcType`] from a table of `Variant = "STEPNAME" (kind)` rows
///
/// The kind is `Spatial`, `Element` or `Other` and drives the classifiers.
macro_rules! ifc_types {
    ($($variant:ident = $step:literal ($kind:ident)),+ $(,)?) => {
        /// IFC entity types the viewer cares about
        ///
        /// Anything else is kept as [`IfcType::Unknown`] with the upper-cased name.
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum IfcType {
            $($variant,)+
            /// Any type not in the table
            Unknown(String),
        }

        impl IfcType {
            /// Parse a STEP type name (case-insensitive)
            pub fn parse(s: &str) -> Self {
                let upper = s.to_ascii_uppercase();
                match upper.as_str() {
                    $($step => IfcType::$variant,)+
                    _ => IfcType::Unknown(upper),
                }
            }

            /// Upper-case STEP name of the type
            pub fn name(&self) -> &str {
                match self {
                    $(IfcType::$variant => $step,)+
                    IfcType::Unknown(name) => name,
                }
            }

            fn kind(&self) -> Kind {
                match self {
                    $(IfcType::$variant => Kind::$kind,)+
                    IfcType::Unknown(_) => Kind::Other,
                }
            }
        }
    };
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Spatial,
    Element,
    Other,
}

ifc_types! {
    IfcProject = "IFCPROJECT" (Spatial),
    IfcSite = "IFCSITE" (Spatial),
    IfcBuilding = "IFCBUILDING" (Spatial),
    IfcBuildingStorey = "IFCBUILDINGSTOREY" (Spatial),
    IfcSpace = "IFCSPACE" (Spatial),

    IfcWall = "IFCWALL" (Element),
    IfcWallStandardCase = "IFCWALLSTANDARDCASE" (Element),
    IfcCurtainWall = "IFCCURTAINWALL" (Element),
    IfcSlab = "IFCSLAB" (Element),
    IfcRoof = "IFCROOF" (Element),
    IfcBeam = "IFCBEAM" (Element),
    IfcColumn = "IFCCOLUMN" (Element),
    IfcDoor = "IFCDOOR" (Element),
    IfcWindow = "IFCWINDOW" (Element),
    IfcStair = "IFCSTAIR" (Element),
    IfcStairFlight = "IFCSTAIRFLIGHT" (Element),
    IfcRamp = "IFCRAMP" (Element),
    IfcRailing = "IFCRAILING" (Element),
    IfcCovering = "IFCCOVERING" (Element),
    IfcPlate = "IFCPLATE" (Element),
    IfcMember = "IFCMEMBER" (Element),
    IfcFooting = "IFCFOOTING" (Element),
    IfcPile = "IFCPILE" (Element),
    IfcBuildingElementProxy = "IFCBUILDINGELEMENTPROXY" (Element),
    IfcFurnishingElement = "IFCFURNISHINGELEMENT" (Element),
    IfcFurniture = "IFCFURNITURE" (Element),
    IfcFlowTerminal = "IFCFLOWTERMINAL" (Element),
    IfcFlowSegment = "IFCFLOWSEGMENT" (Element),
    IfcFlowFitting = "IFCFLOWFITTING" (Element),
    // Voids, never drawn
    IfcOpeningElement = "IFCOPENINGELEMENT" (Other),

    IfcLocalPlacement = "IFCLOCALPLACEMENT" (Other),
    IfcAxis2Placement3D = "IFCAXIS2PLACEMENT3D" (Other),
    IfcCartesianPoint = "IFCCARTESIANPOINT" (Other),
    IfcDirection = "IFCDIRECTION" (Other),

    IfcUnitAssignment = "IFCUNITASSIGNMENT" (Other),
    IfcSIUnit = "IFCSIUNIT" (Other),
    IfcConversionBasedUnit = "IFCCONVERSIONBASEDUNIT" (Other),
    IfcMeasureWithUnit = "IFCMEASUREWITHUNIT" (Other),
}

impl IfcType {
    /// Physical elements that get a box in the viewport
    pub fn is_element(&self) -> bool {
        self.kind() == Kind::Element
    }

    /// Spatial structure containers
    pub fn is_spatial(&self) -> bool {
        self.kind() == Kind::Spatial
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One positional attribute of a decoded record, owned
#[derive(Clone, Debug, PartialEq, Default)]
pub enum AttributeValue {
    /// `$`
    #[default]
    Null,
    /// `*`, value derived from a supertype
    Derived,
    EntityRef(EntityId),
    Integer(i64),
    Float(f64),
    /// Unescaped string content
    String(String),
    /// Enumeration literal without the dots
    Enum(String),
    List(Vec<AttributeValue>),
    /// Wrapped value, e.g. `IFCLABEL('text')`, with the upper-cased wrapper name
    TypedValue(String, Vec<AttributeValue>),
}

impl AttributeValue {
    pub fn as_entity_ref(&self) -> Option<EntityId> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// String content, looking through a typed wrapper such as IFCLABEL
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::TypedValue(_, args) => args.first().and_then(|a| a.as_string()),
            _ => None,
        }
    }

    /// Numeric content; integers widen to float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::TypedValue(_, args) => args.first().and_then(|a| a.as_float()),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A record with its attributes tokenized, positional as in the file
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedEntity {
    pub id: EntityId,
    pub ifc_type: IfcType,
    pub attributes: Vec<AttributeValue>,
}

impl DecodedEntity {
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    pub fn get_ref(&self, index: usize) -> Option<EntityId> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// String at index, with empty strings treated as absent
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index)
            .and_then(|v| v.as_string())
            .filter(|s| !s.is_empty())
    }

    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }

    /// List of entity references at index (non-references are skipped)
    pub fn get_refs(&self, index: usize) -> Vec<EntityId> {
        self.get_list(index)
            .map(|list| list.iter().filter_map(|v| v.as_entity_ref()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ifc_type_parse_is_case_insensitive() {
        assert_eq!(IfcType::parse("IfcWall"), IfcType::IfcWall);
        assert_eq!(IfcType::parse("IFCBUILDINGSTOREY"), IfcType::IfcBuildingStorey);
        assert_eq!(
            IfcType::parse("IfcPropertySet"),
            IfcType::Unknown("IFCPROPERTYSET".to_string())
        );
    }

    #[test]
    fn test_ifc_type_name_matches_parse() {
        for name in ["IFCSLAB", "IFCLOCALPLACEMENT", "IFCSIUNIT", "IFCFOO"] {
            assert_eq!(IfcType::parse(name).name(), name);
        }
    }

    #[test]
    fn test_element_classification() {
        assert!(IfcType::IfcDoor.is_element());
        assert!(!IfcType::IfcOpeningElement.is_element());
        assert!(!IfcType::IfcBuildingStorey.is_element());
        assert!(IfcType::IfcBuildingStorey.is_spatial());
    }

    #[test]
    fn test_typed_value_accessors() {
        let label = AttributeValue::TypedValue(
            "IFCLABEL".to_string(),
            vec![AttributeValue::String("Level 1".to_string())],
        );
        assert_eq!(label.as_string(), Some("Level 1"));

        let length = AttributeValue::TypedValue(
            "IFCLENGTHMEASURE".to_string(),
            vec![AttributeValue::Integer(3)],
        );
        assert_eq!(length.as_float(), Some(3.0));
    }

    #[test]
    fn test_decoded_entity_helpers() {
        let entity = DecodedEntity {
            id: EntityId(10),
            ifc_type: IfcType::IfcWall,
            attributes: vec![
                AttributeValue::String("2O2Fr$t4X7Zf8NOew3FLOH".to_string()),
                AttributeValue::Null,
                AttributeValue::String(String::new()),
                AttributeValue::List(vec![
                    AttributeValue::EntityRef(EntityId(1)),
                    AttributeValue::Integer(5),
                    AttributeValue::EntityRef(EntityId(2)),
                ]),
            ],
        };

        assert_eq!(entity.get_string(0), Some("2O2Fr$t4X7Zf8NOew3FLOH"));
        assert_eq!(entity.get_string(1), None);
        assert_eq!(entity.get_string(2), None);
        assert_eq!(entity.get_refs(3), vec![EntityId(1), EntityId(2)]);
        assert!(entity.get_refs(9).is_empty());
        assert_eq!(EntityId(42).to_string(), "#42");
    }
}
