use std::fmt;

use crate::{Error, FieldShape, Result, ScalarKind, StructLayout};

/// Affects how quickly vertex attributes are consumed from buffers, similar to
/// `vkVertexInputRate`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeRate {
    Vertex,
    Instance,
}

impl Default for VertexAttributeRate {
    fn default() -> Self {
        Self::Vertex
    }
}

/// Format of one vertex attribute, displayed with Vulkan naming
/// (`R32G32B32_SFLOAT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    kind: ScalarKind,
    components: usize,
}

impl VertexFormat {
    /// `None` for `bool`, which has no vertex input format.
    pub fn new(kind: ScalarKind, components: usize) -> Option<Self> {
        if kind == ScalarKind::Bool || !(1..=4).contains(&components) {
            return None;
        }
        Some(Self { kind, components })
    }

    pub fn kind(self) -> ScalarKind {
        self.kind
    }

    pub fn components(self) -> usize {
        self.components
    }

    /// Bytes read by the input assembler, padding excluded.
    pub fn size(self) -> usize {
        self.kind.size() * self.components
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.kind.size() * 8;
        for channel in ["R", "G", "B", "A"].iter().take(self.components) {
            write!(f, "{}{}", channel, bits)?;
        }
        let numeric = match self.kind {
            ScalarKind::Char | ScalarKind::Short | ScalarKind::Int => "SINT",
            ScalarKind::UChar | ScalarKind::UShort | ScalarKind::UInt => "UINT",
            ScalarKind::Half | ScalarKind::Float => "SFLOAT",
            ScalarKind::Bool => unreachable!(),
        };
        write!(f, "_{}", numeric)
    }
}

/// Describes an attribute within a `VertexLayout`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayoutAttribute {
    /// Field the attribute reads, matrices add a `[column]` suffix
    pub name: String,
    /// Format of the attribute
    pub format: VertexFormat,
    /// Which buffer the attribute is contained in
    pub buffer_index: u32,
    /// Affects what input variable within the shader the attribute is assigned
    pub location: u32,
    /// The byte offset of the attribute within the buffer
    pub byte_offset: u32,
}

/// Describes a buffer that provides vertex attribute data (See `VertexLayout`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayoutBuffer {
    pub stride: u32,
    pub rate: VertexAttributeRate,
}

/// Describes how vertex attributes are laid out within one or more buffers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub attributes: Vec<VertexLayoutAttribute>,
    pub buffers: Vec<VertexLayoutBuffer>,
}

impl StructLayout {
    /// Input assembly description of a buffer holding an array of this
    /// struct. Fields take consecutive locations starting at
    /// `first_location`, a matrix takes one location per column.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoVertexFormat` for `bool` based fields and
    /// `Error::VertexOutOfRange` when an offset or the stride exceeds `u32`.
    pub fn vertex_layout(
        &self,
        buffer_index: u32,
        first_location: u32,
        rate: VertexAttributeRate,
    ) -> Result<VertexLayout> {
        let mut attributes = Vec::with_capacity(self.field_count());
        let mut location = first_location;

        for field in self.fields() {
            let no_format = || Error::NoVertexFormat {
                field: field.name().to_owned(),
                field_type: field.field_type().name().to_owned(),
            };

            match field.field_type().shape() {
                FieldShape::Scalar(kind) => {
                    let format = VertexFormat::new(kind, 1).ok_or_else(no_format)?;
                    attributes.push(VertexLayoutAttribute {
                        name: field.name().to_owned(),
                        format,
                        buffer_index,
                        location,
                        byte_offset: self.vertex_u32(field.offset())?,
                    });
                    location += 1;
                }
                FieldShape::Vector {
                    kind, components, ..
                } => {
                    let format = VertexFormat::new(kind, components).ok_or_else(no_format)?;
                    attributes.push(VertexLayoutAttribute {
                        name: field.name().to_owned(),
                        format,
                        buffer_index,
                        location,
                        byte_offset: self.vertex_u32(field.offset())?,
                    });
                    location += 1;
                }
                FieldShape::Matrix {
                    kind,
                    columns,
                    rows,
                } => {
                    let format = VertexFormat::new(kind, rows).ok_or_else(no_format)?;
                    let column_size = field.size() / columns;
                    for column in 0..columns {
                        attributes.push(VertexLayoutAttribute {
                            name: format!("{}[{}]", field.name(), column),
                            format,
                            buffer_index,
                            location,
                            byte_offset: self.vertex_u32(field.offset() + column * column_size)?,
                        });
                        location += 1;
                    }
                }
            }
        }

        Ok(VertexLayout {
            attributes,
            buffers: vec![VertexLayoutBuffer {
                stride: self.vertex_u32(self.stride())?,
                rate,
            }],
        })
    }

    fn vertex_u32(&self, bytes: usize) -> Result<u32> {
        u32::try_from(bytes).map_err(|_err| Error::VertexOutOfRange {
            key: self.key().to_owned(),
            bytes,
        })
    }
}
