use crate::{Error, FieldLayout, FieldValue, Result, StructLayout};

/// Bytes of one struct instance, read and written field by field.
///
/// `B` decides the kind of view: `&[u8]` for reads, `&mut [u8]` to write in
/// place inside an [`Accessor`](crate::Accessor) buffer, `Vec<u8>` for a
/// detached copy. The bytes always cover exactly `layout.size()` bytes, tail
/// padding is never part of a row.
#[derive(Debug, Clone)]
pub struct Row<'a, B> {
    layout: &'a StructLayout,
    bytes: B,
}

impl<'a> Row<'a, Vec<u8>> {
    pub fn zeroed(layout: &'a StructLayout) -> Self {
        Self {
            layout,
            bytes: vec![0; layout.size()],
        }
    }
}

impl<'a, B: AsRef<[u8]>> Row<'a, B> {
    /// Panics if `bytes` does not cover exactly `layout.size()` bytes.
    pub fn new(layout: &'a StructLayout, bytes: B) -> Self {
        assert_eq!(
            bytes.as_ref().len(),
            layout.size(),
            "row of struct '{}' must be {} bytes",
            layout.key(),
            layout.size()
        );
        Self { layout, bytes }
    }

    pub fn layout(&self) -> &'a StructLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }

    /// Copies the row out of its buffer.
    pub fn detach(&self) -> Row<'a, Vec<u8>> {
        Row {
            layout: self.layout,
            bytes: self.as_bytes().to_vec(),
        }
    }

    /// Decodes field `name` as a `T`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` if `T` does not match the field type.
    ///
    /// # Panics
    ///
    /// Panics if the struct has no field called `name`.
    pub fn get<T: FieldValue>(&self, name: &str) -> Result<T> {
        let field = self.checked_field::<T>(name)?;
        Ok(T::decode(&self.as_bytes()[field.range()]))
    }

    fn checked_field<T: FieldValue>(&self, name: &str) -> Result<&'a FieldLayout> {
        let field = self.layout.field(name).unwrap_or_else(|| {
            panic!(
                "struct '{}' has no field named '{}'",
                self.layout.key(),
                name
            )
        });

        let field_type = field.field_type();
        if T::SIZE != field_type.size()
            || T::KIND != field_type.kind()
            || (T::COLUMNS, T::COMPONENTS) != field_type.shape().dimensions()
        {
            return Err(Error::TypeMismatch {
                field: name.to_owned(),
                field_type: field_type.name().to_owned(),
                requested: std::any::type_name::<T>(),
                requested_size: T::SIZE,
            });
        }

        Ok(field)
    }
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> Row<'a, B> {
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes.as_mut()
    }

    /// Encodes `value` into field `name`. Nothing is written on error.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` if `T` does not match the field type.
    ///
    /// # Panics
    ///
    /// Panics if the struct has no field called `name`.
    pub fn set<T: FieldValue>(&mut self, name: &str, value: T) -> Result<()> {
        let field = self.checked_field::<T>(name)?;
        value.encode(&mut self.bytes.as_mut()[field.range()]);
        Ok(())
    }
}
