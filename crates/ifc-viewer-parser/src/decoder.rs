// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lazy entity decoder with caching

use crate::scanner::{EntityIndex, EntityScanner};
use crate::tokenizer::parse_entity;
use ifc_viewer_model::{DecodedEntity, EntityId, IfcType, ParseError, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Decodes entities on demand
///
/// One scanner pass builds an id index and a type index; attribute decoding
/// happens only when an entity is first requested.
pub struct EntityDecoder<'a> {
    content: &'a str,
    index: EntityIndex,
    by_type: FxHashMap<IfcType, Vec<EntityId>>,
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
}

impl<'a> EntityDecoder<'a> {
    pub fn new(content: &'a str) -> Self {
        let mut index = EntityIndex::default();
        let mut by_type: FxHashMap<IfcType, Vec<EntityId>> = FxHashMap::default();

        for raw in EntityScanner::new(content) {
            by_type
                .entry(IfcType::parse(raw.type_name))
                .or_default()
                .push(EntityId(raw.id));
            index.insert(raw.id, raw.span);
        }

        log::debug!(
            "[Decoder] Indexed {} entities of {} types",
            index.len(),
            by_type.len()
        );

        Self {
            content,
            index,
            by_type,
            cache: FxHashMap::default(),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.index.len()
    }

    /// Ids of all entities with the given type, in file order
    pub fn ids_of_type(&self, ifc_type: &IfcType) -> &[EntityId] {
        self.by_type.get(ifc_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of all entities whose type matches `predicate`, sorted
    pub fn ids_where(&self, predicate: impl Fn(&IfcType) -> bool) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .by_type
            .iter()
            .filter(|(t, _)| predicate(t))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Decode entity by ID
    pub fn decode_by_id(&mut self, id: EntityId) -> Result<Arc<DecodedEntity>> {
        if let Some(cached) = self.cache.get(&id.0) {
            return Ok(Arc::clone(cached));
        }

        let span = self
            .index
            .get(&id.0)
            .cloned()
            .ok_or(ParseError::EntityNotFound(id))?;

        let entity = parse_entity(&self.content[span])
            .map_err(|e| ParseError::entity_parse(id, e))?;

        let arc = Arc::new(entity);
        self.cache.insert(id.0, Arc::clone(&arc));
        Ok(arc)
    }

    /// Decode an entity, returning `None` when it is missing or malformed
    pub fn get(&mut self, id: EntityId) -> Option<Arc<DecodedEntity>> {
        match self.decode_by_id(id) {
            Ok(entity) => Some(entity),
            Err(e) => {
                log::warn!("[Decoder] {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
#1=IFCWALL('a',$,'W1',$,$,$,$,$);\n\
#2=IFCSLAB('b',$,'S1',$,$,$,$,$);\n\
#3=IFCWALL('c',$,'W2',$,$,$,$,$);\n\
#4=IFCWALL('broken',$;\n\
ENDSEC;\nEND-ISO-10303-21;\n";

    #[test]
    fn test_type_index() {
        let decoder = EntityDecoder::new(CONTENT);
        assert_eq!(decoder.entity_count(), 4);
        assert_eq!(
            decoder.ids_of_type(&IfcType::IfcWall),
            &[EntityId(1), EntityId(3), EntityId(4)]
        );
        assert!(decoder.ids_of_type(&IfcType::IfcDoor).is_empty());
        assert_eq!(
            decoder.ids_where(|t| t.is_element()),
            vec![EntityId(1), EntityId(2), EntityId(3), EntityId(4)]
        );
    }

    #[test]
    fn test_decode_is_cached() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let first = decoder.decode_by_id(EntityId(2)).unwrap();
        let second = decoder.decode_by_id(EntityId(2)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.get_string(2), Some("S1"));
    }

    #[test]
    fn test_decode_errors() {
        let mut decoder = EntityDecoder::new(CONTENT);
        assert!(matches!(
            decoder.decode_by_id(EntityId(99)),
            Err(ParseError::EntityNotFound(EntityId(99)))
        ));
        assert!(matches!(
            decoder.decode_by_id(EntityId(4)),
            Err(ParseError::EntityParse(EntityId(4), _))
        ));
        assert!(decoder.get(EntityId(4)).is_none());
    }
}
