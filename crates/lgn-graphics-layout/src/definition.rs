use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Error, FieldType, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    field_type: &'static FieldType,
}

impl Field {
    /// # Errors
    ///
    /// Returns `Error::UnknownType` if `type_name` is not a native type.
    pub fn new(name: &str, type_name: &str) -> Result<Self> {
        let field_type = FieldType::lookup(type_name).map_err(|_err| Error::UnknownType {
            field: name.to_owned(),
            type_name: type_name.to_owned(),
        })?;
        Ok(Self::with_type(name, field_type))
    }

    pub fn with_type(name: &str, field_type: &'static FieldType) -> Self {
        Self {
            name: name.to_owned(),
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &'static FieldType {
        self.field_type
    }
}

/// Ordered list of uniquely named fields mirroring a shader struct.
///
/// The declaration order is the layout order, it must match the shader
/// source exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDefinition {
    key: String,
    fields: Vec<Field>,
    fields_by_name: HashMap<String, usize>,
}

impl StructDefinition {
    /// # Errors
    ///
    /// Will return `Err` if `fields` is empty or if two fields share a name.
    pub fn new(key: &str, fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::EmptyDefinition {
                key: key.to_owned(),
            });
        }

        let mut fields_by_name = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if fields_by_name.insert(field.name.clone(), index).is_some() {
                return Err(Error::DuplicateField {
                    key: key.to_owned(),
                    field: field.name.clone(),
                });
            }
        }

        Ok(Self {
            key: key.to_owned(),
            fields,
            fields_by_name,
        })
    }

    pub fn builder(key: &str) -> StructDefinitionBuilder {
        StructDefinitionBuilder::new(key)
    }

    /// Parses a single struct table (`key` plus a `fields` array).
    ///
    /// # Errors
    ///
    /// Will return `Err` on malformed TOML or on any definition error.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let desc: StructDesc = toml::from_str(text)?;
        desc.into_definition()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields_by_name
            .get(name)
            .map(|index| &self.fields[*index])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false, a definition holds at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub struct StructDefinitionBuilder {
    key: String,
    fields: Vec<Field>,
    names: HashSet<String>,
}

impl StructDefinitionBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            fields: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if the name is already taken or the type is unknown.
    pub fn add_field(mut self, name: &str, type_name: &str) -> Result<Self> {
        // check field uniqueness
        if !self.names.insert(name.to_owned()) {
            return Err(Error::DuplicateField {
                key: self.key,
                field: name.to_owned(),
            });
        }
        self.fields.push(Field::new(name, type_name)?);
        Ok(self)
    }

    /// # Errors
    ///
    /// Will return `Err` if no field was added.
    pub fn build(self) -> Result<StructDefinition> {
        StructDefinition::new(&self.key, self.fields)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDesc {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StructDesc {
    key: String,
    #[serde(default)]
    fields: Vec<FieldDesc>,
}

impl StructDesc {
    fn into_definition(self) -> Result<StructDefinition> {
        let fields = self
            .fields
            .iter()
            .map(|field| Field::new(&field.name, &field.type_name))
            .collect::<Result<Vec<_>>>()?;
        StructDefinition::new(&self.key, fields)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionsDesc {
    #[serde(default)]
    structs: Vec<StructDesc>,
}

/// Parses every entry of a `structs` array, in document order.
///
/// # Errors
///
/// Will return `Err` on malformed TOML or on the first invalid definition.
pub fn load_definitions(text: &str) -> Result<Vec<StructDefinition>> {
    let desc: DefinitionsDesc = toml::from_str(text)?;
    desc.structs
        .into_iter()
        .map(StructDesc::into_definition)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let definition = StructDefinition::builder("Light")
            .add_field("color", "float3")
            .unwrap()
            .add_field("radius", "float")
            .unwrap()
            .add_field("enabled", "bool")
            .unwrap()
            .build()
            .unwrap();

        let names: Vec<_> = definition.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["color", "radius", "enabled"]);
        assert_eq!(definition.field("radius").unwrap().field_type().name(), "float");
        assert!(definition.field("intensity").is_none());
        assert_eq!(definition.len(), 3);
    }

    #[test]
    fn empty_definition_is_rejected() {
        assert!(matches!(
            StructDefinitionBuilder::new("Nothing").build(),
            Err(Error::EmptyDefinition { key }) if key == "Nothing"
        ));
        assert!(StructDefinition::new("Nothing", Vec::new()).is_err());
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let result = StructDefinition::builder("Light")
            .add_field("color", "float3")
            .and_then(|builder| builder.add_field("color", "float4"));
        assert!(matches!(
            result,
            Err(Error::DuplicateField { key, field }) if key == "Light" && field == "color"
        ));

        let fields = vec![
            Field::new("a", "int").unwrap(),
            Field::new("a", "uint").unwrap(),
        ];
        assert!(matches!(
            StructDefinition::new("Pair", fields),
            Err(Error::DuplicateField { .. })
        ));
    }

    #[test]
    fn unknown_type_names_the_field() {
        let result = StructDefinition::builder("Light").add_field("color", "colour3");
        assert!(matches!(
            result,
            Err(Error::UnknownType { field, type_name }) if field == "color" && type_name == "colour3"
        ));
    }

    #[test]
    fn from_toml() {
        let definition = StructDefinition::from_toml_str(
            r#"
            key = "Vertex"
            fields = [
                { name = "position", type = "packed_float3" },
                { name = "uv", type = "simd_float2" },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(definition.key(), "Vertex");
        assert_eq!(definition.fields()[1].field_type().name(), "float2");
    }

    #[test]
    fn load_several_definitions() {
        let definitions = load_definitions(
            r#"
            [[structs]]
            key = "Vertex"
            fields = [{ name = "position", type = "packed_float3" }]

            [[structs]]
            key = "Instance"

            [[structs.fields]]
            name = "world"
            type = "float4x4"

            [[structs.fields]]
            name = "tint"
            type = "half4"
            "#,
        )
        .unwrap();
        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[1].key(), "Instance");
        assert_eq!(definitions[1].len(), 2);

        assert!(matches!(
            load_definitions("[[structs]]\nkey = \"Empty\"\n"),
            Err(Error::EmptyDefinition { .. })
        ));
        assert!(matches!(load_definitions("structs = 3"), Err(Error::Toml(_))));
    }
}
