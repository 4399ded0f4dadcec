/// Typed vertex (and instance) buffers.
///
/// A vertex buffer is created from the contents of a [`NativeBuffer`]; its
/// layout is the cached [`FormatDescriptor`] of `V`. Writable buffers can be
/// rewritten later from another arena.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::util::{FormatDescriptor, FormatLayout, NativeBuffer};

/// Immutable vertex buffer of shape `V`
pub struct VertexBuffer<V: FormatLayout> {
    handle: OwnedHandle,
    format: Arc<FormatDescriptor>,
    count: u32,
    _shape: PhantomData<fn() -> V>,
}

/// Vertex buffer of shape `V` whose contents can be replaced
pub struct WritableVertexBuffer<V: FormatLayout> {
    buffer: VertexBuffer<V>,
}

impl<V: FormatLayout> VertexBuffer<V> {
    pub(crate) fn create(backend: &SharedBackend, initial: &NativeBuffer<V>, writable: bool) -> Result<Self> {
        let format = FormatDescriptor::of::<V>()?;
        let data = initial.as_bytes()?;
        let count = initial.count()?;
        let stride = format.stride();

        let raw = with_backend(backend, "strata::VertexBuffer", |backend| {
            backend.create_vertex_buffer(data, stride, writable)
        })?;

        Ok(Self {
            handle: OwnedHandle::new(raw, backend.clone()),
            format,
            count,
            _shape: PhantomData,
        })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    /// Layout of one vertex
    pub fn format(&self) -> &Arc<FormatDescriptor> {
        &self.format
    }

    /// Number of vertices last uploaded
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl<V: FormatLayout> WritableVertexBuffer<V> {
    pub(crate) fn new(buffer: VertexBuffer<V>) -> Self {
        Self { buffer }
    }

    /// Replace the contents with `[0, count)` of `data`
    pub fn write(&mut self, data: &NativeBuffer<V>) -> Result<()> {
        let bytes = data.as_bytes()?;
        if bytes.is_empty() {
            return Err(crate::strata_fail!(
                "strata::VertexBuffer",
                Error::InvalidArgument("Cannot write an empty vertex buffer".to_string())
            ));
        }

        let handle = self.buffer.handle();
        with_backend(self.buffer.handle.backend(), "strata::VertexBuffer", |backend| {
            backend.write_vertex_buffer(handle, bytes)
        })?;
        self.buffer.count = data.count()?;
        Ok(())
    }
}

impl<V: FormatLayout> std::ops::Deref for WritableVertexBuffer<V> {
    type Target = VertexBuffer<V>;

    fn deref(&self) -> &VertexBuffer<V> {
        &self.buffer
    }
}

impl<V: FormatLayout> fmt::Debug for VertexBuffer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("handle", &self.handle())
            .field("count", &self.count)
            .field("stride", &self.format.stride())
            .finish()
    }
}

impl<V: FormatLayout> fmt::Debug for WritableVertexBuffer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WritableVertexBuffer").field(&self.buffer).finish()
    }
}

#[cfg(test)]
#[path = "vertex_buffer_tests.rs"]
mod tests;
