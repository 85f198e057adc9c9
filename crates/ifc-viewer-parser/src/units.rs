// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit scale extraction

use crate::decoder::EntityDecoder;
use ifc_viewer_model::{DecodedEntity, IfcType};

/// Conversion chains deeper than this are treated as cyclic
const MAX_UNIT_DEPTH: usize = 8;

/// Scale factor from file length units to metres
///
/// Follows IFCPROJECT → IFCUNITASSIGNMENT → length unit. Returns 1.0 when
/// no length unit is declared.
pub fn extract_unit_scale(decoder: &mut EntityDecoder<'_>) -> f64 {
    let Some(&project_id) = decoder.ids_of_type(&IfcType::IfcProject).first() else {
        return 1.0;
    };
    let Some(project) = decoder.get(project_id) else {
        return 1.0;
    };

    // IFCPROJECT.UnitsInContext
    let Some(assignment) = project.get_ref(8).and_then(|id| decoder.get(id)) else {
        return 1.0;
    };

    for unit_id in assignment.get_refs(0) {
        let Some(unit) = decoder.get(unit_id) else {
            continue;
        };
        if let Some(scale) = length_unit_scale(&unit, decoder, 0) {
            log::debug!("[Units] Length unit scale {scale}");
            return scale;
        }
    }

    1.0
}

fn length_unit_scale(
    unit: &DecodedEntity,
    decoder: &mut EntityDecoder<'_>,
    depth: usize,
) -> Option<f64> {
    if depth > MAX_UNIT_DEPTH {
        log::warn!("[Units] Unit chain at {} is too deep, ignoring base unit", unit.id);
        return None;
    }
    match unit.ifc_type {
        // IFCSIUNIT(Dimensions, UnitType, Prefix, Name)
        IfcType::IfcSIUnit => {
            if unit.get_enum(1)? != "LENGTHUNIT" {
                return None;
            }
            Some(si_prefix_scale(unit.get_enum(2)))
        }
        // IFCCONVERSIONBASEDUNIT(Dimensions, UnitType, Name, ConversionFactor)
        IfcType::IfcConversionBasedUnit => {
            if unit.get_enum(1)? != "LENGTHUNIT" {
                return None;
            }
            // IFCMEASUREWITHUNIT(ValueComponent, UnitComponent)
            let measure = decoder.get(unit.get_ref(3)?)?;
            let value = measure.get_float(0)?;
            let base = measure
                .get_ref(1)
                .and_then(|id| decoder.get(id))
                .and_then(|base| length_unit_scale(&base, decoder, depth + 1))
                .unwrap_or(1.0);
            Some(value * base)
        }
        _ => None,
    }
}

fn si_prefix_scale(prefix: Option<&str>) -> f64 {
    match prefix {
        Some("EXA") => 1e18,
        Some("PETA") => 1e15,
        Some("TERA") => 1e12,
        Some("GIGA") => 1e9,
        Some("MEGA") => 1e6,
        Some("KILO") => 1e3,
        Some("HECTO") => 1e2,
        Some("DECA") => 1e1,
        Some("DECI") => 1e-1,
        Some("CENTI") => 1e-2,
        Some("MILLI") => 1e-3,
        Some("MICRO") => 1e-6,
        Some("NANO") => 1e-9,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(units: &str) -> String {
        format!(
            "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCPROJECT('p',$,'Project',$,$,$,$,$,#2);\n\
#2=IFCUNITASSIGNMENT((#4,#3));\n\
{units}\n\
ENDSEC;\nEND-ISO-10303-21;\n"
        )
    }

    #[test]
    fn test_millimetre_project() {
        let text = content(
            "#3=IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);\n#4=IFCSIUNIT(*,.AREAUNIT.,$,.SQUARE_METRE.);",
        );
        let mut decoder = EntityDecoder::new(&text);
        assert_eq!(extract_unit_scale(&mut decoder), 1e-3);
    }

    #[test]
    fn test_foot_project() {
        let text = content(
            "#3=IFCCONVERSIONBASEDUNIT(#5,.LENGTHUNIT.,'FOOT',#6);\n\
#4=IFCSIUNIT(*,.TIMEUNIT.,$,.SECOND.);\n\
#5=IFCDIMENSIONALEXPONENTS(1,0,0,0,0,0,0);\n\
#6=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(0.3048),#7);\n\
#7=IFCSIUNIT(*,.LENGTHUNIT.,$,.METRE.);",
        );
        let mut decoder = EntityDecoder::new(&text);
        assert!((extract_unit_scale(&mut decoder) - 0.3048).abs() < 1e-12);
    }

    #[test]
    fn test_self_referencing_conversion_unit_terminates() {
        let text = content(
            "#3=IFCCONVERSIONBASEDUNIT(*,.LENGTHUNIT.,'FOOT',#5);\n\
#4=IFCSIUNIT(*,.TIMEUNIT.,$,.SECOND.);\n\
#5=IFCMEASUREWITHUNIT(IFCLENGTHMEASURE(0.3048),#3);",
        );
        let mut decoder = EntityDecoder::new(&text);
        let scale = extract_unit_scale(&mut decoder);
        assert!(scale.is_finite() && scale > 0.0);
    }

    #[test]
    fn test_missing_project_defaults_to_metres() {
        let text = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n#1=IFCWALL('w',$,$,$,$,$,$,$);\nENDSEC;\n";
        let mut decoder = EntityDecoder::new(text);
        assert_eq!(extract_unit_scale(&mut decoder), 1.0);
    }
}
