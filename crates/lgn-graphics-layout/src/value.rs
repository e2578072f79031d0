//! Typed values a struct field can be read as or written from.
//!
//! Every supported shape has an explicit little endian encoding, there is no
//! reinterpretation of memory. Natural vectors and matrix columns carry their
//! padding components: padding is written as zero and ignored on read.

use half::f16;

use crate::ScalarKind;

/// A value with a fixed GPU encoding.
///
/// `SIZE`, `KIND`, `COLUMNS` and `COMPONENTS` must match the field type the
/// value is stored in; [`Row`](crate::Row) checks all of them before touching
/// any byte.
pub trait FieldValue: Sized {
    const KIND: ScalarKind;
    const SIZE: usize;
    /// Components per column, padding excluded.
    const COMPONENTS: usize;
    /// Only matrices have more than one.
    const COLUMNS: usize = 1;

    /// Writes exactly `SIZE` bytes at the start of `out`.
    fn encode(&self, out: &mut [u8]);

    /// Reads exactly `SIZE` bytes from the start of `bytes`.
    fn decode(bytes: &[u8]) -> Self;
}

/// Marker for single component values, the building block of vectors.
pub trait ScalarValue: FieldValue + Copy + Default {}

macro_rules! impl_scalar_value {
    ( $ty:ty, $kind:ident ) => {
        impl FieldValue for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;
            const SIZE: usize = std::mem::size_of::<$ty>();
            const COMPONENTS: usize = 1;

            fn encode(&self, out: &mut [u8]) {
                out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
            }

            fn decode(bytes: &[u8]) -> Self {
                let mut raw = [0_u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                Self::from_le_bytes(raw)
            }
        }

        impl ScalarValue for $ty {}
    };
}

impl_scalar_value!(i8, Char);
impl_scalar_value!(u8, UChar);
impl_scalar_value!(i16, Short);
impl_scalar_value!(u16, UShort);
impl_scalar_value!(i32, Int);
impl_scalar_value!(u32, UInt);
impl_scalar_value!(f32, Float);

impl FieldValue for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
    const SIZE: usize = 1;
    const COMPONENTS: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl ScalarValue for bool {}

impl FieldValue for f16 {
    const KIND: ScalarKind = ScalarKind::Half;
    const SIZE: usize = 2;
    const COMPONENTS: usize = 1;

    fn encode(&self, out: &mut [u8]) {
        self.to_bits().encode(out);
    }

    fn decode(bytes: &[u8]) -> Self {
        Self::from_bits(u16::decode(bytes))
    }
}

impl ScalarValue for f16 {}

/// Plain arrays are packed vectors: `[f32; 3]` is a `packed_float3`.
impl<T: ScalarValue, const N: usize> FieldValue for [T; N] {
    const KIND: ScalarKind = T::KIND;
    const SIZE: usize = T::SIZE * N;
    const COMPONENTS: usize = N;

    fn encode(&self, out: &mut [u8]) {
        for (component, chunk) in self.iter().zip(out.chunks_exact_mut(T::SIZE)) {
            component.encode(chunk);
        }
    }

    fn decode(bytes: &[u8]) -> Self {
        std::array::from_fn(|i| T::decode(&bytes[i * T::SIZE..]))
    }
}

/// Component count a natural vector of `n` components occupies.
const fn padded(n: usize) -> usize {
    n.next_power_of_two()
}

fn encode_natural<T: ScalarValue>(components: &[T], out: &mut [u8]) {
    let size = T::SIZE * padded(components.len());
    let (data, padding) = out[..size].split_at_mut(T::SIZE * components.len());
    for (component, chunk) in components.iter().zip(data.chunks_exact_mut(T::SIZE)) {
        component.encode(chunk);
    }
    padding.fill(0);
}

fn decode_natural<T: ScalarValue, const N: usize>(bytes: &[u8]) -> [T; N] {
    <[T; N]>::decode(bytes)
}

macro_rules! impl_natural_vector {
    ( $name:ident, $scalar:ty, $n:literal ) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq)]
        pub struct $name(pub [$scalar; $n]);

        impl FieldValue for $name {
            const KIND: ScalarKind = <$scalar as FieldValue>::KIND;
            const SIZE: usize = <$scalar as FieldValue>::SIZE * padded($n);
            const COMPONENTS: usize = $n;

            fn encode(&self, out: &mut [u8]) {
                encode_natural(&self.0, out);
            }

            fn decode(bytes: &[u8]) -> Self {
                Self(decode_natural(bytes))
            }
        }

        impl From<[$scalar; $n]> for $name {
            fn from(value: [$scalar; $n]) -> Self {
                Self(value)
            }
        }

        impl From<$name> for [$scalar; $n] {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Float
impl_natural_vector!(Float2, f32, 2);
impl_natural_vector!(Float3, f32, 3);
impl_natural_vector!(Float4, f32, 4);

// Half
impl_natural_vector!(Half2, f16, 2);
impl_natural_vector!(Half3, f16, 3);
impl_natural_vector!(Half4, f16, 4);

// Int / Uint
impl_natural_vector!(Int2, i32, 2);
impl_natural_vector!(Int3, i32, 3);
impl_natural_vector!(Int4, i32, 4);
impl_natural_vector!(Uint2, u32, 2);
impl_natural_vector!(Uint3, u32, 3);
impl_natural_vector!(Uint4, u32, 4);

// Short / Ushort
impl_natural_vector!(Short2, i16, 2);
impl_natural_vector!(Short3, i16, 3);
impl_natural_vector!(Short4, i16, 4);
impl_natural_vector!(Ushort2, u16, 2);
impl_natural_vector!(Ushort3, u16, 3);
impl_natural_vector!(Ushort4, u16, 4);

// Char / Uchar
impl_natural_vector!(Char2, i8, 2);
impl_natural_vector!(Char3, i8, 3);
impl_natural_vector!(Char4, i8, 4);
impl_natural_vector!(Uchar2, u8, 2);
impl_natural_vector!(Uchar3, u8, 3);
impl_natural_vector!(Uchar4, u8, 4);

// Bool
impl_natural_vector!(Bool2, bool, 2);
impl_natural_vector!(Bool3, bool, 3);
impl_natural_vector!(Bool4, bool, 4);

macro_rules! impl_matrix {
    ( $name:ident, $scalar:ty, $columns:literal, $rows:literal ) => {
        /// Column major, one natural vector per column.
        #[derive(Debug, Default, Clone, Copy, PartialEq)]
        pub struct $name(pub [[$scalar; $rows]; $columns]);

        impl $name {
            const COLUMN_SIZE: usize = <$scalar as FieldValue>::SIZE * padded($rows);
        }

        impl FieldValue for $name {
            const KIND: ScalarKind = <$scalar as FieldValue>::KIND;
            const SIZE: usize = Self::COLUMN_SIZE * $columns;
            const COMPONENTS: usize = $rows;
            const COLUMNS: usize = $columns;

            fn encode(&self, out: &mut [u8]) {
                for (column, chunk) in self
                    .0
                    .iter()
                    .zip(out[..Self::SIZE].chunks_exact_mut(Self::COLUMN_SIZE))
                {
                    encode_natural(column, chunk);
                }
            }

            fn decode(bytes: &[u8]) -> Self {
                Self(std::array::from_fn(|column| {
                    decode_natural(&bytes[column * Self::COLUMN_SIZE..])
                }))
            }
        }
    };
}

impl_matrix!(Float2x2, f32, 2, 2);
impl_matrix!(Float2x3, f32, 2, 3);
impl_matrix!(Float2x4, f32, 2, 4);
impl_matrix!(Float3x2, f32, 3, 2);
impl_matrix!(Float3x3, f32, 3, 3);
impl_matrix!(Float3x4, f32, 3, 4);
impl_matrix!(Float4x2, f32, 4, 2);
impl_matrix!(Float4x3, f32, 4, 3);
impl_matrix!(Float4x4, f32, 4, 4);

impl_matrix!(Half2x2, f16, 2, 2);
impl_matrix!(Half2x3, f16, 2, 3);
impl_matrix!(Half2x4, f16, 2, 4);
impl_matrix!(Half3x2, f16, 3, 2);
impl_matrix!(Half3x3, f16, 3, 3);
impl_matrix!(Half3x4, f16, 3, 4);
impl_matrix!(Half4x2, f16, 4, 2);
impl_matrix!(Half4x3, f16, 4, 3);
impl_matrix!(Half4x4, f16, 4, 4);

// glam interop: glam vectors and matrices map to the natural float, int and
// uint types.
macro_rules! impl_glam_vector {
    ( $glam:ty, $name:ident ) => {
        impl From<$glam> for $name {
            fn from(value: $glam) -> Self {
                Self(value.to_array())
            }
        }

        impl From<$name> for $glam {
            fn from(value: $name) -> Self {
                Self::from(value.0)
            }
        }

        impl FieldValue for $glam {
            const KIND: ScalarKind = $name::KIND;
            const SIZE: usize = $name::SIZE;
            const COMPONENTS: usize = $name::COMPONENTS;

            fn encode(&self, out: &mut [u8]) {
                $name::from(*self).encode(out);
            }

            fn decode(bytes: &[u8]) -> Self {
                $name::decode(bytes).into()
            }
        }
    };
}

impl_glam_vector!(glam::Vec2, Float2);
impl_glam_vector!(glam::Vec3, Float3);
impl_glam_vector!(glam::Vec4, Float4);
impl_glam_vector!(glam::IVec2, Int2);
impl_glam_vector!(glam::IVec3, Int3);
impl_glam_vector!(glam::IVec4, Int4);
impl_glam_vector!(glam::UVec2, Uint2);
impl_glam_vector!(glam::UVec3, Uint3);
impl_glam_vector!(glam::UVec4, Uint4);

macro_rules! impl_glam_matrix {
    ( $glam:ty, $name:ident ) => {
        impl From<$glam> for $name {
            fn from(value: $glam) -> Self {
                Self(value.to_cols_array_2d())
            }
        }

        impl From<$name> for $glam {
            fn from(value: $name) -> Self {
                Self::from_cols_array_2d(&value.0)
            }
        }

        impl FieldValue for $glam {
            const KIND: ScalarKind = ScalarKind::Float;
            const SIZE: usize = $name::SIZE;
            const COMPONENTS: usize = $name::COMPONENTS;
            const COLUMNS: usize = $name::COLUMNS;

            fn encode(&self, out: &mut [u8]) {
                $name::from(*self).encode(out);
            }

            fn decode(bytes: &[u8]) -> Self {
                $name::decode(bytes).into()
            }
        }
    };
}

impl_glam_matrix!(glam::Mat2, Float2x2);
impl_glam_matrix!(glam::Mat3, Float3x3);
impl_glam_matrix!(glam::Mat4, Float4x4);

macro_rules! impl_half_from_glam {
    ( $glam:ty, $name:ident, $n:literal ) => {
        impl From<$glam> for $name {
            fn from(value: $glam) -> Self {
                let value: [f32; $n] = value.to_array();
                Self(value.map(f16::from_f32))
            }
        }

        impl From<$name> for $glam {
            fn from(value: $name) -> Self {
                Self::from(value.0.map(f16::to_f32))
            }
        }
    };
}

impl_half_from_glam!(glam::Vec2, Half2, 2);
impl_half_from_glam!(glam::Vec3, Half3, 3);
impl_half_from_glam!(glam::Vec4, Half4, 4);

#[cfg(test)]
mod tests {
    use glam::{Mat3, Vec3};

    use super::*;

    fn encoded<T: FieldValue>(value: &T) -> Vec<u8> {
        let mut out = vec![0xAA; T::SIZE];
        value.encode(&mut out);
        out
    }

    #[test]
    fn scalar_encoding_is_little_endian() {
        assert_eq!(encoded(&0x0102_0304_u32), [4, 3, 2, 1]);
        assert_eq!(encoded(&-2_i16), [0xFE, 0xFF]);
        assert_eq!(encoded(&1.0_f32), 1.0_f32.to_le_bytes());
        assert_eq!(encoded(&true), [1]);
        assert!(!bool::decode(&[0]));
        assert!(bool::decode(&[7]));
        assert_eq!(f16::decode(&encoded(&f16::from_f32(0.5))), f16::from_f32(0.5));
    }

    #[test]
    fn packed_array_sizes() {
        assert_eq!(<[f32; 3]>::SIZE, 12);
        assert_eq!(<[f16; 3]>::SIZE, 6);
        assert_eq!(<[u8; 4]>::SIZE, 4);
        assert_eq!(<[i16; 2]>::KIND, ScalarKind::Short);
        assert_eq!(<[f16; 3]>::COMPONENTS, 3);
        assert_eq!(<[u16; 2]>::decode(&encoded(&[7_u16, 9])), [7, 9]);
    }

    #[test]
    fn natural_vector_padding_is_zeroed() {
        assert_eq!(Float3::SIZE, 16);
        assert_eq!(Half3::SIZE, 8);
        assert_eq!(Bool3::SIZE, 4);
        assert_eq!(Float2::SIZE, 8);

        let bytes = encoded(&Float3([1.0, 2.0, 3.0]));
        assert_eq!(&bytes[12..], [0, 0, 0, 0]);
        assert_eq!(Float3::decode(&bytes), Float3([1.0, 2.0, 3.0]));

        let bytes = encoded(&Uchar3([1, 2, 3]));
        assert_eq!(bytes, [1, 2, 3, 0]);
    }

    #[test]
    fn matrix_columns_are_padded() {
        assert_eq!(Float3x3::SIZE, 48);
        assert_eq!(Float4x4::SIZE, 64);
        assert_eq!(Float2x3::SIZE, 32);
        assert_eq!(Float3x2::SIZE, 24);
        assert_eq!(Half4x3::SIZE, 32);
        assert_eq!((Half4x3::COLUMNS, Half4x3::COMPONENTS), (4, 3));
        assert_eq!((Float3::COLUMNS, Float3::COMPONENTS), (1, 3));

        let matrix = Float3x3([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let bytes = encoded(&matrix);
        // second column starts at 16, after one padding float
        assert_eq!(f32::decode(&bytes[16..]), 4.0);
        assert_eq!(&bytes[12..16], [0, 0, 0, 0]);
        assert_eq!(Float3x3::decode(&bytes), matrix);
    }

    #[test]
    fn glam_interop() {
        assert_eq!(Vec3::SIZE, 16);
        let v = Vec3::new(1.0, -2.0, 3.5);
        assert_eq!(Vec3::decode(&encoded(&v)), v);
        assert_eq!(glam::Vec3::from(Float3::from(v)), v);

        let m = Mat3::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(Mat3::SIZE, 48);
        assert_eq!(Mat3::decode(&encoded(&m)), m);
        assert_eq!(encoded(&m), encoded(&Float3x3::from(m)));

        let half = Half3::from(Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(Vec3::from(half), Vec3::new(0.5, 1.0, 2.0));
    }
}
