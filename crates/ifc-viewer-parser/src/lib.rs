// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC Viewer Parser - the model loader adapter
//!
//! Decodes STEP/IFC files into [`SceneNode`](ifc_viewer_model::SceneNode)s
//! through the [`ModelLoader`](ifc_viewer_model::ModelLoader) trait.
//!
//! # Features
//!
//! - **Fast scanning** with `memchr` to index entities without decoding them
//! - **nom tokenizer** for entity and header records
//! - **Lazy decoding** - only entities reached from products are parsed
//! - **Placement resolution** of `IfcLocalPlacement` chains with `nalgebra`
//!
//! # Example
//!
//! ```ignore
//! use ifc_viewer_model::ModelLoader;
//! use ifc_viewer_parser::StepLoader;
//!
//! let node = StepLoader::default().load(&bytes, "house.ifc")?;
//! println!("{} elements", node.elements.len());
//! ```

mod decoder;
mod loader;
mod placement;
mod scanner;
mod tokenizer;
mod units;

pub use decoder::EntityDecoder;
pub use loader::{LoaderSettings, StepLoader};
pub use placement::PlacementResolver;
pub use scanner::{
    parse_header, EntityIndex, EntityScanner, HeaderInfo, RawEntity, STEP_MAGIC,
};
pub use tokenizer::{parse_entity, Token};
pub use units::extract_unit_scale;
