//! Numeric type tags describing vertex, instance and uniform fields to the backend.

use std::any::{type_name, TypeId};
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::{Error, Result};

/// Numeric type of one field, as understood by the backend
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    /// i8
    Byte,
    /// u8
    UByte,
    /// i16
    Short,
    /// u16
    UShort,
    /// i32
    Int,
    /// u32
    UInt,
    /// i64
    Long,
    /// u64
    ULong,
    /// f32
    Float,
    /// f64
    Double,
    /// 2 x f32
    Float2,
    /// 3 x f32
    Float3,
    /// 4 x f32
    Float4,
    /// 4 x 4 f32, column major
    Float4x4,
}

impl NumericType {
    /// Size of one value in bytes
    pub fn size_bytes(self) -> u32 {
        match self {
            NumericType::Byte | NumericType::UByte => 1,
            NumericType::Short | NumericType::UShort => 2,
            NumericType::Int | NumericType::UInt | NumericType::Float => 4,
            NumericType::Long | NumericType::ULong | NumericType::Double => 8,
            NumericType::Float2 => 8,
            NumericType::Float3 => 12,
            NumericType::Float4 => 16,
            NumericType::Float4x4 => 64,
        }
    }

    /// Numeric type of the Rust type `F`
    ///
    /// Scalars map to themselves; `glam` vectors/matrix and the equivalent
    /// `f32` arrays map to the vector and matrix tags.
    ///
    /// # Errors
    ///
    /// `UnsupportedFieldType` for any other type.
    pub fn of<F: 'static>() -> Result<Self> {
        Self::from_type_id(TypeId::of::<F>())
            .ok_or_else(|| Error::UnsupportedFieldType(type_name::<F>().to_string()))
    }

    pub(crate) fn from_type_id(id: TypeId) -> Option<Self> {
        let table: [(TypeId, NumericType); 18] = [
            (TypeId::of::<i8>(), NumericType::Byte),
            (TypeId::of::<u8>(), NumericType::UByte),
            (TypeId::of::<i16>(), NumericType::Short),
            (TypeId::of::<u16>(), NumericType::UShort),
            (TypeId::of::<i32>(), NumericType::Int),
            (TypeId::of::<u32>(), NumericType::UInt),
            (TypeId::of::<i64>(), NumericType::Long),
            (TypeId::of::<u64>(), NumericType::ULong),
            (TypeId::of::<f32>(), NumericType::Float),
            (TypeId::of::<f64>(), NumericType::Double),
            (TypeId::of::<Vec2>(), NumericType::Float2),
            (TypeId::of::<Vec3>(), NumericType::Float3),
            (TypeId::of::<Vec4>(), NumericType::Float4),
            (TypeId::of::<Mat4>(), NumericType::Float4x4),
            (TypeId::of::<[f32; 2]>(), NumericType::Float2),
            (TypeId::of::<[f32; 3]>(), NumericType::Float3),
            (TypeId::of::<[f32; 4]>(), NumericType::Float4),
            (TypeId::of::<[[f32; 4]; 4]>(), NumericType::Float4x4),
        ];
        table.iter().find(|(ty, _)| *ty == id).map(|(_, numeric)| *numeric)
    }
}

#[cfg(test)]
#[path = "numeric_type_tests.rs"]
mod tests;
