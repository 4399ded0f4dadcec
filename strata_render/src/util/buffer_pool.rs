/// Recycles [`NativeBuffer`] arenas per element type.
///
/// Render loops check out scratch buffers every frame (command streams,
/// vertex staging). Returned arenas are cleared and queued (FIFO) for the
/// next request of the same element type, so their capacity is reused
/// instead of reallocated.
///
/// The pool is a cheap-clone handle around one locked map of idle queues.
/// Only checkout and return take the lock; a checked-out buffer is owned
/// exclusively by its [`PooledBuffer`].
///
/// # Example
///
/// ```ignore
/// let pool = BufferPool::new();
/// let mut scratch = pool.request::<u32>()?;
/// scratch.add_all(&[1, 2, 3])?;
/// scratch.release()?;                 // back in the queue, count reset
/// let again = pool.request::<u32>()?; // same arena, capacity kept
/// ```

use std::any::{Any, TypeId};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::util::native_buffer::{BufferElement, NativeBuffer};

type IdleQueues = FxHashMap<TypeId, VecDeque<Box<dyn Any + Send>>>;

/// Shared pool of idle arenas, keyed by element type
#[derive(Clone, Default)]
pub struct BufferPool {
    idle: Arc<Mutex<IdleQueues>>,
}

impl BufferPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out an arena for element type `T`
    ///
    /// Reuses the oldest idle arena of that type if any, otherwise allocates
    /// a fresh zero-capacity one. The returned buffer always has count 0.
    pub fn request<T: BufferElement>(&self) -> Result<PooledBuffer<T>> {
        let reused = {
            let mut idle = self.lock()?;
            idle.get_mut(&TypeId::of::<T>())
                .and_then(|queue| queue.pop_front())
                .and_then(|boxed| boxed.downcast::<NativeBuffer<T>>().ok())
        };

        let buffer = match reused {
            Some(buffer) => {
                let buffer = *buffer;
                crate::strata_trace!(
                    "strata::BufferPool",
                    "Reusing {} buffer (capacity {})",
                    std::any::type_name::<T>(), buffer.capacity()?
                );
                buffer
            }
            None => {
                crate::strata_trace!(
                    "strata::BufferPool",
                    "Allocating new {} buffer",
                    std::any::type_name::<T>()
                );
                NativeBuffer::new()
            }
        };

        Ok(PooledBuffer {
            buffer: Some(buffer),
            pool: self.clone(),
        })
    }

    /// Number of idle arenas queued for element type `T`
    pub fn idle_count<T: BufferElement>(&self) -> Result<usize> {
        let idle = self.lock()?;
        Ok(idle.get(&TypeId::of::<T>()).map_or(0, VecDeque::len))
    }

    fn give_back<T: BufferElement>(&self, mut buffer: NativeBuffer<T>) -> Result<()> {
        buffer.clear()?;
        let mut idle = self.lock()?;
        idle.entry(TypeId::of::<T>())
            .or_default()
            .push_back(Box::new(buffer));
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, IdleQueues>> {
        self.idle.lock().map_err(|_| {
            crate::strata_fail!(
                "strata::BufferPool",
                Error::BackendError("Buffer pool lock poisoned".to_string())
            )
        })
    }
}

impl std::fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queues = self.idle.lock().map(|idle| idle.len()).unwrap_or(0);
        f.debug_struct("BufferPool").field("element_types", &queues).finish()
    }
}

// ============================================================================
// PooledBuffer
// ============================================================================

/// An arena checked out of a [`BufferPool`]
///
/// Proxies every [`NativeBuffer`] operation. After [`PooledBuffer::release`]
/// every call fails with `Error::Disposed("PooledBuffer")`. Dropping an
/// unreleased buffer releases it.
#[derive(Debug)]
pub struct PooledBuffer<T: BufferElement> {
    buffer: Option<NativeBuffer<T>>,
    pool: BufferPool,
}

impl<T: BufferElement> PooledBuffer<T> {
    fn inner(&self) -> Result<&NativeBuffer<T>> {
        self.buffer.as_ref().ok_or(Error::Disposed("PooledBuffer"))
    }

    fn inner_mut(&mut self) -> Result<&mut NativeBuffer<T>> {
        self.buffer.as_mut().ok_or(Error::Disposed("PooledBuffer"))
    }

    /// The underlying arena
    pub fn unpooled(&self) -> Result<&NativeBuffer<T>> {
        self.inner()
    }

    pub fn capacity(&self) -> Result<u32> {
        self.inner()?.capacity()
    }

    pub fn count(&self) -> Result<u32> {
        self.inner()?.count()
    }

    pub fn reserve(&mut self, min_capacity: u32) -> Result<()> {
        self.inner_mut()?.reserve(min_capacity)
    }

    pub fn add(&mut self, value: T) -> Result<()> {
        self.inner_mut()?.add(value)
    }

    pub fn add_all(&mut self, values: &[T]) -> Result<()> {
        self.inner_mut()?.add_all(values)
    }

    pub fn set(&mut self, index: u32, value: T) -> Result<()> {
        self.inner_mut()?.set(index, value)
    }

    pub fn set_all(&mut self, index: u32, values: &[T]) -> Result<()> {
        self.inner_mut()?.set_all(index, values)
    }

    pub fn get(&self, index: u32) -> Result<T> {
        self.inner()?.get(index)
    }

    pub fn put(&mut self, index: u32, value: T) -> Result<()> {
        self.inner_mut()?.put(index, value)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.inner_mut()?.clear()
    }

    pub fn as_slice(&self) -> Result<&[T]> {
        self.inner()?.as_slice()
    }

    /// Whether the buffer went back to its pool
    pub fn is_released(&self) -> bool {
        self.buffer.is_none()
    }

    /// Clear the arena and return it to the pool
    ///
    /// # Errors
    ///
    /// `Disposed` if already released.
    pub fn release(&mut self) -> Result<()> {
        let buffer = self.buffer.take().ok_or(Error::Disposed("PooledBuffer"))?;
        self.pool.give_back(buffer)
    }
}

impl<T: BufferElement> Drop for PooledBuffer<T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            // A poisoned pool drops the arena
            let _ = self.pool.give_back(buffer);
        }
    }
}

#[cfg(test)]
#[path = "buffer_pool_tests.rs"]
mod tests;
