use std::ops::Range;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::{FieldType, StructDefinition};

/// Rounds `value` up to the next multiple of `alignment` (a power of two).
pub const fn round_up(value: usize, alignment: usize) -> usize {
    (value + alignment - 1) & !(alignment - 1)
}

/// Placement of one field inside a struct instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLayout {
    name: String,
    field_type: &'static FieldType,
    offset: usize,
}

impl FieldLayout {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &'static FieldType {
        self.field_type
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> usize {
        self.field_type.size()
    }

    /// Bytes covered by the field, relative to the start of the struct.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size()
    }
}

/// Computed memory layout of a [`StructDefinition`].
///
/// `size` is the end of the last field, `stride` is `size` rounded up to the
/// struct alignment and is the distance between consecutive array elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructLayout {
    key: String,
    alignment: usize,
    size: usize,
    stride: usize,
    fields: IndexMap<String, FieldLayout>,
}

impl StructLayout {
    /// Lays `definition` out with the [`StandardLayout`] rules.
    pub fn compute(definition: &StructDefinition) -> Self {
        StandardLayout.compute_layout(definition)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.get(name)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldLayout> {
        self.fields.values()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Bytes needed to hold `count` elements.
    pub fn buffer_size(&self, count: usize) -> usize {
        count * self.stride
    }
}

/// Layout rules of a target shading language.
///
/// Another graphics ABI (different 3-component padding for instance) plugs
/// in here together with its own field type table.
pub trait LayoutStrategy {
    fn compute_layout(&self, definition: &StructDefinition) -> StructLayout;
}

/// Standard struct layout: every field starts at a multiple of its own
/// alignment, the struct aligns to its most aligned field.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardLayout;

impl LayoutStrategy for StandardLayout {
    fn compute_layout(&self, definition: &StructDefinition) -> StructLayout {
        let alignment = definition
            .fields()
            .iter()
            .map(|field| field.field_type().alignment())
            .fold(1, usize::max);

        let mut cursor = 0;
        let mut fields = IndexMap::with_capacity(definition.len());
        for field in definition.fields() {
            let field_type = field.field_type();
            let offset = round_up(cursor, field_type.alignment());
            cursor = offset + field_type.size();
            fields.insert(
                field.name().to_owned(),
                FieldLayout {
                    name: field.name().to_owned(),
                    field_type,
                    offset,
                },
            );
        }

        let layout = StructLayout {
            key: definition.key().to_owned(),
            alignment,
            size: cursor,
            stride: round_up(cursor, alignment),
            fields,
        };

        debug!(
            "struct layout '{}': size {}, alignment {}, stride {}",
            layout.key, layout.size, layout.alignment, layout.stride
        );

        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of(fields: &[(&str, &str)]) -> StructLayout {
        let mut builder = StructDefinition::builder("Test");
        for (name, ty) in fields {
            builder = builder.add_field(name, ty).unwrap();
        }
        StructLayout::compute(&builder.build().unwrap())
    }

    fn offsets(layout: &StructLayout) -> Vec<usize> {
        layout.fields().map(FieldLayout::offset).collect()
    }

    #[test]
    fn round_up_to_power_of_two() {
        assert_eq!(round_up(0, 16), 0);
        assert_eq!(round_up(1, 16), 16);
        assert_eq!(round_up(16, 16), 16);
        assert_eq!(round_up(20, 16), 32);
        assert_eq!(round_up(7, 1), 7);
        assert_eq!(round_up(6, 4), 8);
    }

    #[test]
    fn packed_vertex() {
        let layout = layout_of(&[
            ("position", "packed_float3"),
            ("normal", "packed_float3"),
            ("textureCoordinate", "packed_float2"),
        ]);
        assert_eq!(offsets(&layout), [0, 12, 24]);
        assert_eq!(layout.alignment(), 4);
        assert_eq!(layout.size(), 32);
        assert_eq!(layout.stride(), 32);
    }

    #[test]
    fn single_scalar() {
        let layout = layout_of(&[("x", "float")]);
        assert_eq!(layout.size(), 4);
        assert_eq!(layout.alignment(), 4);
        assert_eq!(layout.stride(), 4);
    }

    #[test]
    fn natural_vector_then_scalar() {
        let layout = layout_of(&[("v", "float3"), ("s", "float")]);
        assert_eq!(offsets(&layout), [0, 16]);
        assert_eq!(layout.size(), 20);
        assert_eq!(layout.alignment(), 16);
        assert_eq!(layout.stride(), 32);
    }

    #[test]
    fn scalar_then_natural_vector() {
        // start of `v` aligns to float3, not to the preceding float
        let layout = layout_of(&[("s", "float"), ("v", "float3")]);
        assert_eq!(offsets(&layout), [0, 16]);
        assert_eq!(layout.size(), 32);
        assert_eq!(layout.stride(), 32);
    }

    #[test]
    fn mixed_widths() {
        let layout = layout_of(&[
            ("flag", "bool"),
            ("id", "ushort"),
            ("tint", "half3"),
            ("scale", "packed_float3"),
            ("world", "float4x4"),
            ("layer", "uchar"),
        ]);
        assert_eq!(offsets(&layout), [0, 2, 8, 16, 32, 96]);
        assert_eq!(layout.size(), 97);
        assert_eq!(layout.alignment(), 16);
        assert_eq!(layout.stride(), 112);
        assert_eq!(layout.buffer_size(3), 336);
    }

    #[test]
    fn layout_invariants() {
        let definitions: &[&[(&str, &str)]] = &[
            &[("a", "char"), ("b", "float2x3"), ("c", "half")],
            &[("a", "packed_half3"), ("b", "short"), ("c", "uint4")],
            &[("a", "half2x2"), ("b", "bool2"), ("c", "packed_uchar3")],
        ];
        for fields in definitions {
            let layout = layout_of(fields);
            let max_alignment = layout
                .fields()
                .map(|field| field.field_type().alignment())
                .max()
                .unwrap();
            assert_eq!(layout.alignment(), max_alignment);
            assert_eq!(layout.stride() % layout.alignment(), 0);
            assert!(layout.stride() >= layout.size());
            for field in layout.fields() {
                assert_eq!(field.offset() % field.field_type().alignment(), 0);
                assert!(field.range().end <= layout.size());
            }
            let last = layout.fields().last().unwrap();
            assert_eq!(last.range().end, layout.size());
        }
    }

    #[test]
    fn deterministic() {
        let fields = [("v", "float3"), ("s", "float"), ("m", "half3x3")];
        assert_eq!(layout_of(&fields), layout_of(&fields));
    }
}
