// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for loading and scene operations

use crate::EntityId;
use thiserror::Error;

/// Shorthand for fallible loading steps
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while turning file bytes into a scene node
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Not a STEP exchange file, or no usable DATA section
    #[error("Not a readable IFC file: {0}")]
    InvalidFormat(String),

    #[error("Bad HEADER section: {0}")]
    InvalidHeader(String),

    /// A record the scanner located could not be tokenized
    #[error("Cannot decode entity {0}: {1}")]
    EntityParse(EntityId, String),

    /// Dangling `#id` reference
    #[error("No entity {0} in file")]
    EntityNotFound(EntityId),

    /// FILE_SCHEMA names something other than IFC2X3 or IFC4*
    #[error("Schema {0} is not supported")]
    UnsupportedSchema(String),
}

impl ParseError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    pub fn entity_parse(id: EntityId, msg: impl Into<String>) -> Self {
        Self::EntityParse(id, msg.into())
    }
}

/// Errors raised by a [`Scene`](crate::Scene) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The scene refuses further nodes
    #[error("Scene is full ({limit} nodes)")]
    Capacity { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParseError::entity_parse(EntityId(7), "bad list");
        assert_eq!(err.to_string(), "Cannot decode entity #7: bad list");

        let err = SceneError::Capacity { limit: 2 };
        assert_eq!(err.to_string(), "Scene is full (2 nodes)");
    }

    #[test]
    fn test_utf8_conversion() {
        let bytes = [0xff, 0xfe, 0x00];
        let err: ParseError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, ParseError::Encoding(_)));
    }
}
