/// Layout description of plain-data shapes (vertices, instances, uniforms).
///
/// A shape declares its fields once through [`FormatLayout`] (usually via the
/// [`format_layout!`](crate::format_layout) macro). [`FormatDescriptor::of`]
/// turns that declaration into elements sorted by byte offset, with slot
/// indices assigned in that order, and caches the result per shape.
///
/// # Example
///
/// ```ignore
/// #[repr(C)]
/// #[derive(Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
/// struct Vertex {
///     position: [f32; 3],
///     uv: [f32; 2],
/// }
///
/// strata_render::format_layout!(Vertex { position: [f32; 3], uv: [f32; 2] });
///
/// let descriptor = FormatDescriptor::of::<Vertex>()?;
/// assert_eq!(descriptor.elements()[1].offset, 12);
/// ```

use std::any::{type_name, TypeId};
use std::sync::{Arc, Mutex, OnceLock};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::util::native_buffer::BufferElement;
use crate::util::numeric_type::NumericType;

// ============================================================================
// Field declarations
// ============================================================================

/// One declared field of a plain-data shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Byte offset within the shape
    pub offset: u32,
}

impl FieldLayout {
    /// Field `name` of type `F` at byte `offset`
    pub fn of<F: 'static>(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            type_id: TypeId::of::<F>(),
            type_name: type_name::<F>(),
            offset: offset as u32,
        }
    }
}

/// A plain-data shape that can describe its own fields
///
/// Implement with [`format_layout!`](crate::format_layout) rather than by hand.
pub trait FormatLayout: BufferElement + bytemuck::Pod + Sync {
    /// Every field of the shape, in any order
    fn fields() -> Vec<FieldLayout>;
}

/// Implement [`FormatLayout`] for a `#[repr(C)]` struct
///
/// Each `field: Type` pair is checked against the struct definition at
/// compile time; offsets come from `std::mem::offset_of!`.
#[macro_export]
macro_rules! format_layout {
    ($shape:ty { $($field:ident : $field_ty:ty),+ $(,)? }) => {
        impl $crate::strata::util::FormatLayout for $shape {
            fn fields() -> Vec<$crate::strata::util::FieldLayout> {
                vec![$({
                    let _: fn(&$shape) -> &$field_ty = |shape| &shape.$field;
                    $crate::strata::util::FieldLayout::of::<$field_ty>(
                        stringify!($field),
                        std::mem::offset_of!($shape, $field),
                    )
                }),+]
            }
        }
    };
}

// ============================================================================
// Descriptor
// ============================================================================

/// One element of a [`FormatDescriptor`], as handed to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatElement {
    /// Shader input location / uniform member index
    pub slot: u32,
    pub numeric_type: NumericType,
    /// Byte offset within the shape
    pub offset: u32,
}

/// Ordered element list of one shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescriptor {
    elements: Vec<FormatElement>,
    stride: u32,
}

/// Descriptors computed so far, one per shape
static DESCRIPTOR_CACHE: OnceLock<Mutex<FxHashMap<TypeId, Arc<FormatDescriptor>>>> = OnceLock::new();

impl FormatDescriptor {
    /// Cached descriptor of shape `T`
    ///
    /// Computed on first request; later requests return the same `Arc`.
    /// Failures are not cached.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFieldType` if a field has no numeric type
    /// - `OverlappingFields` if two fields share bytes
    pub fn of<T: FormatLayout>() -> Result<Arc<FormatDescriptor>> {
        let cache = DESCRIPTOR_CACHE.get_or_init(|| Mutex::new(FxHashMap::default()));
        let mut cache = cache.lock().map_err(|_| {
            crate::strata_fail!(
                "strata::FormatDescriptor",
                Error::BackendError("Format descriptor cache lock poisoned".to_string())
            )
        })?;

        if let Some(descriptor) = cache.get(&TypeId::of::<T>()) {
            return Ok(descriptor.clone());
        }

        let descriptor = Self::from_fields(&T::fields(), std::mem::size_of::<T>() as u32)
            .map_err(|error| crate::strata_fail!("strata::FormatDescriptor", error))?;
        let descriptor = Arc::new(descriptor);
        cache.insert(TypeId::of::<T>(), descriptor.clone());

        crate::strata_debug!(
            "strata::FormatDescriptor",
            "Described {} ({} elements, stride {})",
            type_name::<T>(), descriptor.elements.len(), descriptor.stride
        );

        Ok(descriptor)
    }

    /// Build a descriptor from explicit field declarations
    ///
    /// Fields are sorted by offset and given slots `0..n` in that order.
    pub fn from_fields(fields: &[FieldLayout], stride: u32) -> Result<FormatDescriptor> {
        let mut typed = Vec::with_capacity(fields.len());
        for field in fields {
            let numeric_type = NumericType::from_type_id(field.type_id)
                .ok_or_else(|| Error::UnsupportedFieldType(field.type_name.to_string()))?;
            typed.push((field, numeric_type));
        }

        typed.sort_by_key(|(field, _)| field.offset);

        for pair in typed.windows(2) {
            let (first, first_type) = pair[0];
            let (second, _) = pair[1];
            if first.offset + first_type.size_bytes() > second.offset {
                return Err(Error::OverlappingFields(format!(
                    "'{}' (offset {}, {} bytes) overlaps '{}' (offset {})",
                    first.name, first.offset, first_type.size_bytes(), second.name, second.offset
                )));
            }
        }

        let elements = typed
            .iter()
            .enumerate()
            .map(|(slot, (field, numeric_type))| FormatElement {
                slot: slot as u32,
                numeric_type: *numeric_type,
                offset: field.offset,
            })
            .collect();

        Ok(FormatDescriptor { elements, stride })
    }

    /// Descriptor with no elements (pipelines without instance data)
    pub fn empty() -> FormatDescriptor {
        FormatDescriptor { elements: Vec::new(), stride: 0 }
    }

    /// Elements sorted by offset
    pub fn elements(&self) -> &[FormatElement] {
        &self.elements
    }

    /// Size of one shape in bytes
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[cfg(test)]
#[path = "format_descriptor_tests.rs"]
mod tests;
