use thiserror::Error;

/// An error type for the graphics-layout crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("struct '{key}' has no fields")]
    EmptyDefinition { key: String },
    #[error("field '{field}' already exists in struct '{key}'")]
    DuplicateField { key: String, field: String },
    #[error("field '{field}' has an unknown type '{type_name}'")]
    UnknownType { field: String, type_name: String },
    #[error("unknown field type '{0}'")]
    UnknownTypeName(String),
    #[error(
        "field '{field}' of type '{field_type}' cannot be accessed as `{requested}` ({requested_size} bytes)"
    )]
    TypeMismatch {
        field: String,
        field_type: String,
        requested: &'static str,
        requested_size: usize,
    },
    #[error("field '{field}' of type '{field_type}' has no vertex format")]
    NoVertexFormat { field: String, field_type: String },
    #[error("struct '{key}' does not fit a vertex buffer, {bytes} bytes exceeds u32 range")]
    VertexOutOfRange { key: String, bytes: usize },
    #[error("struct '{key}' is already cached with a different field list")]
    KeyConflict { key: String },
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A result type that can be used to indicate errors.
pub type Result<T> = std::result::Result<T, Error>;
