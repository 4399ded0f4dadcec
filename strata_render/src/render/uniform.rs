/// Uniform buffers and uniform bindings.
///
/// A [`UniformBuffer<U>`] holds an array of `U` blocks for one uniform slot
/// of a shader. A [`UniformBinding`] attaches a buffer (or nothing yet) to
/// that slot; command streams bind it to a pipeline with an element index.

use std::fmt;
use std::marker::PhantomData;
use crate::error::Result;
use crate::render::backend::with_backend;
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::util::{FormatLayout, NativeBuffer};

/// Uniform block array of shape `U`
pub struct UniformBuffer<U: FormatLayout> {
    handle: OwnedHandle,
    binding: u32,
    count: u32,
    _shape: PhantomData<fn() -> U>,
}

impl<U: FormatLayout> UniformBuffer<U> {
    pub(crate) fn new(handle: OwnedHandle, binding: u32, count: u32) -> Self {
        Self { handle, binding, count, _shape: PhantomData }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    /// Shader binding slot this buffer was created for
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Number of blocks last uploaded
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Replace the contents with `[0, count)` of `data`
    pub fn write(&mut self, data: &NativeBuffer<U>) -> Result<()> {
        let bytes = data.as_bytes()?;
        let handle = self.handle();
        with_backend(self.handle.backend(), "strata::UniformBuffer", |backend| {
            backend.write_uniform_buffer(handle, bytes)
        })?;
        self.count = data.count()?;
        Ok(())
    }
}

impl<U: FormatLayout> fmt::Debug for UniformBuffer<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformBuffer")
            .field("handle", &self.handle())
            .field("binding", &self.binding)
            .field("count", &self.count)
            .finish()
    }
}

/// A shader uniform slot joined with a uniform buffer
#[derive(Debug)]
pub struct UniformBinding {
    handle: OwnedHandle,
    binding: u32,
}

impl UniformBinding {
    pub(crate) fn new(handle: OwnedHandle, binding: u32) -> Self {
        Self { handle, binding }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Point the binding at another buffer of the same slot
    pub fn update<U: FormatLayout>(&self, buffer: Option<&UniformBuffer<U>>) -> Result<()> {
        let handle = self.handle();
        let buffer = buffer.map_or(NativeHandle::NULL, UniformBuffer::handle);
        with_backend(self.handle.backend(), "strata::UniformBinding", |backend| {
            backend.update_uniform_binding(handle, buffer)
        })
    }
}
