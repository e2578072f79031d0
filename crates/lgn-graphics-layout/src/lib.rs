//! Shader struct layouts and typed access to arrays of GPU structures.
//!
//! A [`StructDefinition`] lists named fields whose types come from the
//! native [`FieldType`] registry. [`StructLayout::compute`] lays them out
//! the way the shader compiler does (natural vectors padded to a power of two,
//! packed vectors tight, matrices as arrays of natural columns). An
//! [`Accessor`] then addresses a byte buffer as an array of such structures and
//! hands out [`Row`]s to read and write individual fields.
//!
//! ```
//! use lgn_graphics_layout::{Accessor, StructDefinition, StructLayout};
//! use std::sync::Arc;
//!
//! let definition = StructDefinition::builder("Vertex")
//!     .add_field("position", "packed_float3")?
//!     .add_field("normal", "packed_float3")?
//!     .add_field("texture_coordinate", "packed_float2")?
//!     .build()?;
//! let layout = Arc::new(StructLayout::compute(&definition));
//! assert_eq!(layout.stride(), 32);
//!
//! let mut vertices = Accessor::with_count(layout, 3);
//! vertices.get_mut(1).set("position", [1.0_f32, 2.0, 3.0])?;
//! assert_eq!(vertices.get(1).get::<[f32; 3]>("position")?, [1.0, 2.0, 3.0]);
//! # Ok::<(), lgn_graphics_layout::Error>(())
//! ```

mod accessor;
mod cache;
mod definition;
mod errors;
mod field_type;
mod layout;
mod row;
mod value;
mod vertex;

pub use accessor::Accessor;
pub use cache::LayoutCache;
pub use definition::{load_definitions, Field, StructDefinition, StructDefinitionBuilder};
pub use errors::{Error, Result};
pub use field_type::{FieldShape, FieldType, ScalarKind};
pub use layout::{round_up, FieldLayout, LayoutStrategy, StandardLayout, StructLayout};
pub use row::Row;
pub use value::*;
pub use vertex::{
    VertexAttributeRate, VertexFormat, VertexLayout, VertexLayoutAttribute, VertexLayoutBuffer,
};

pub mod prelude {
    pub use crate::Accessor;
    pub use crate::FieldValue;
    pub use crate::Row;
    pub use crate::StructDefinition;
    pub use crate::StructLayout;
}
