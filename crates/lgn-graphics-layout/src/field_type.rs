use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::Serialize;

use crate::{Error, Result};

/// Component type of every native field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Half,
    Float,
}

impl ScalarKind {
    pub const ALL: [Self; 9] = [
        Self::Bool,
        Self::Char,
        Self::UChar,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Half,
        Self::Float,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::UChar => "uchar",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Half => "half",
            Self::Float => "float",
        }
    }

    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::Char | Self::UChar => 1,
            Self::Short | Self::UShort | Self::Half => 2,
            Self::Int | Self::UInt | Self::Float => 4,
        }
    }

    /// Matrices only exist for floating point components.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Half | Self::Float)
    }

    fn sized_alias(self) -> Option<&'static str> {
        match self {
            Self::Char => Some("int8_t"),
            Self::UChar => Some("uint8_t"),
            Self::Short => Some("int16_t"),
            Self::UShort => Some("uint16_t"),
            Self::Int => Some("int32_t"),
            Self::UInt => Some("uint32_t"),
            Self::Bool | Self::Half | Self::Float => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structural description of a field type, used to pick its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    Scalar(ScalarKind),
    Vector {
        kind: ScalarKind,
        components: usize,
        packed: bool,
    },
    /// Column major, `columns` natural vectors of `rows` components.
    Matrix {
        kind: ScalarKind,
        columns: usize,
        rows: usize,
    },
}

impl FieldShape {
    pub fn kind(&self) -> ScalarKind {
        match *self {
            Self::Scalar(kind) | Self::Vector { kind, .. } | Self::Matrix { kind, .. } => kind,
        }
    }

    /// `(columns, components per column)`, padding excluded.
    pub fn dimensions(&self) -> (usize, usize) {
        match *self {
            Self::Scalar(_) => (1, 1),
            Self::Vector { components, .. } => (1, components),
            Self::Matrix { columns, rows, .. } => (columns, rows),
        }
    }
}

/// A native type a struct field can be declared with.
///
/// Descriptors live in a process wide table and are handed out as
/// `&'static FieldType`; two descriptors are the same type when their
/// canonical names are equal.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
pub struct FieldType {
    name: String,
    size: usize,
    alignment: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    shape: FieldShape,
}

impl FieldType {
    /// Resolves a canonical name or an alias.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTypeName` if no native type answers to `name`.
    pub fn lookup(name: &str) -> Result<&'static Self> {
        let registry: &'static FieldTypeRegistry = &REGISTRY;
        registry
            .get(name)
            .ok_or_else(|| Error::UnknownTypeName(name.to_owned()))
    }

    pub fn all() -> impl Iterator<Item = &'static Self> {
        let registry: &'static FieldTypeRegistry = &REGISTRY;
        registry.types.iter()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }

    pub fn kind(&self) -> ScalarKind {
        self.shape.kind()
    }

    fn scalar(kind: ScalarKind) -> Self {
        Self {
            name: kind.name().to_owned(),
            size: kind.size(),
            alignment: kind.size(),
            aliases: kind.sized_alias().into_iter().map(str::to_owned).collect(),
            shape: FieldShape::Scalar(kind),
        }
    }

    fn natural_vector(kind: ScalarKind, components: usize) -> Self {
        let name = format!("{}{}", kind, components);
        let size = kind.size() * components.next_power_of_two();
        let aliases = if kind == ScalarKind::Bool {
            Vec::new()
        } else {
            vec![format!("vector_{}", name), format!("simd_{}", name)]
        };
        Self {
            name,
            size,
            alignment: size,
            aliases,
            shape: FieldShape::Vector {
                kind,
                components,
                packed: false,
            },
        }
    }

    fn packed_vector(kind: ScalarKind, components: usize) -> Self {
        Self {
            name: format!("packed_{}{}", kind, components),
            size: kind.size() * components,
            alignment: kind.size(),
            aliases: Vec::new(),
            shape: FieldShape::Vector {
                kind,
                components,
                packed: true,
            },
        }
    }

    fn matrix(kind: ScalarKind, columns: usize, rows: usize) -> Self {
        let column = Self::natural_vector(kind, rows);
        let name = format!("{}{}x{}", kind, columns, rows);
        Self {
            aliases: vec![format!("matrix_{}", name), format!("simd_{}", name)],
            name,
            size: columns * column.size,
            alignment: column.alignment,
            shape: FieldShape::Matrix {
                kind,
                columns,
                rows,
            },
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

struct FieldTypeRegistry {
    types: Vec<FieldType>,
    by_name: HashMap<String, usize>,
}

impl FieldTypeRegistry {
    fn new() -> Self {
        let mut types = Vec::new();
        for kind in ScalarKind::ALL {
            types.push(FieldType::scalar(kind));
        }
        for kind in ScalarKind::ALL {
            for components in 2..=4 {
                types.push(FieldType::natural_vector(kind, components));
                types.push(FieldType::packed_vector(kind, components));
            }
        }
        for kind in ScalarKind::ALL.into_iter().filter(|kind| kind.is_float()) {
            for columns in 2..=4 {
                for rows in 2..=4 {
                    types.push(FieldType::matrix(kind, columns, rows));
                }
            }
        }

        let mut by_name = HashMap::new();
        for (index, ty) in types.iter().enumerate() {
            by_name.insert(ty.name.clone(), index);
            for alias in &ty.aliases {
                by_name.insert(alias.clone(), index);
            }
        }

        Self { types, by_name }
    }

    fn get(&'static self, name: &str) -> Option<&'static FieldType> {
        self.by_name.get(name).map(|index| &self.types[*index])
    }
}

lazy_static! {
    static ref REGISTRY: FieldTypeRegistry = FieldTypeRegistry::new();
}
