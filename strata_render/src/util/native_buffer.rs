/// Growable typed arena handed to native backends.
///
/// Storage is one contiguous block of `capacity` elements, of which the
/// first `count` are logically live. Capacity always moves in multiples of
/// [`GROWTH_QUANTUM`] and never shrinks; slots in `[count, capacity)` read
/// back as `T::default()`.
///
/// Any call that can grow the buffer may relocate the block, so pointers
/// obtained through [`NativeBuffer::as_ptr`] must be re-fetched afterwards.
///
/// # Example
///
/// ```ignore
/// let mut buffer = NativeBuffer::<u32>::new();
/// buffer.add(7)?;              // capacity 0 -> 16
/// buffer.set(20, 9)?;          // capacity 16 -> 32, count 21
/// assert_eq!(buffer.get(5)?, 0);
/// ```

use crate::error::{Error, Result};

/// Capacity granularity, in elements
pub const GROWTH_QUANTUM: u32 = 16;

/// Smallest multiple of [`GROWTH_QUANTUM`] strictly greater than `requested`.
///
/// Always leaves at least one spare slot for the next append.
pub fn calculate_capacity(requested: u32) -> Result<u32> {
    let wanted = requested.checked_add(1).ok_or(Error::OutOfMemory)?;
    let quanta = wanted.div_ceil(GROWTH_QUANTUM);
    quanta.checked_mul(GROWTH_QUANTUM).ok_or(Error::OutOfMemory)
}

/// Element types a [`NativeBuffer`] can hold
///
/// Plain `Copy` data with a default value for unwritten slots. Command
/// records (tagged enums) qualify as well as vertex and uniform shapes.
pub trait BufferElement: Copy + Default + Send + 'static {}

impl<T: Copy + Default + Send + 'static> BufferElement for T {}

/// Growable typed arena
#[derive(Debug)]
pub struct NativeBuffer<T: BufferElement> {
    /// Backing block; `len()` is the capacity. `None` once disposed.
    storage: Option<Vec<T>>,
    count: u32,
}

impl<T: BufferElement> NativeBuffer<T> {
    /// Create an empty arena with zero capacity
    pub fn new() -> Self {
        Self {
            storage: Some(Vec::new()),
            count: 0,
        }
    }

    /// Create an arena able to hold at least `initial_capacity` elements
    pub fn with_capacity(initial_capacity: u32) -> Result<Self> {
        let capacity = calculate_capacity(initial_capacity)?;
        Ok(Self {
            storage: Some(vec![T::default(); capacity as usize]),
            count: 0,
        })
    }

    fn storage(&self) -> Result<&Vec<T>> {
        self.storage.as_ref().ok_or(Error::Disposed("NativeBuffer"))
    }

    fn storage_mut(&mut self) -> Result<&mut Vec<T>> {
        self.storage.as_mut().ok_or(Error::Disposed("NativeBuffer"))
    }

    /// Number of allocated element slots
    pub fn capacity(&self) -> Result<u32> {
        Ok(self.storage()?.len() as u32)
    }

    /// Number of live elements
    pub fn count(&self) -> Result<u32> {
        self.storage()?;
        Ok(self.count)
    }

    /// Whether no element is live
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// Grow to `calculate_capacity(min_capacity)` unless already that large.
    ///
    /// Existing elements keep their indices. Never shrinks.
    pub fn reserve(&mut self, min_capacity: u32) -> Result<()> {
        let target = calculate_capacity(min_capacity)?;
        let storage = self.storage_mut()?;
        if target as usize > storage.len() {
            storage.resize(target as usize, T::default());
        }
        Ok(())
    }

    /// Append one element
    pub fn add(&mut self, value: T) -> Result<()> {
        let capacity = self.capacity()?;
        if self.count == capacity {
            self.reserve(capacity + 1)?;
        }
        let index = self.count as usize;
        self.storage_mut()?[index] = value;
        self.count += 1;
        Ok(())
    }

    /// Append a run of elements
    pub fn add_all(&mut self, values: &[T]) -> Result<()> {
        let start = self.count()?;
        let len = u32::try_from(values.len()).map_err(|_| Error::OutOfMemory)?;
        let end = start.checked_add(len).ok_or(Error::OutOfMemory)?;
        if end > self.capacity()? {
            self.reserve(end)?;
        }
        self.storage_mut()?[start as usize..end as usize].copy_from_slice(values);
        self.count = end;
        Ok(())
    }

    /// Write `value` at `index`, growing if needed.
    ///
    /// `count` becomes `max(count, index + 1)`; skipped slots hold the default.
    pub fn set(&mut self, index: u32, value: T) -> Result<()> {
        if index >= self.capacity()? {
            self.reserve(index.checked_add(1).ok_or(Error::OutOfMemory)?)?;
        }
        let count = self.count as usize;
        let storage = self.storage_mut()?;
        let index_usize = index as usize;
        if index_usize > count {
            storage[count..index_usize].fill(T::default());
        }
        storage[index_usize] = value;
        self.count = self.count.max(index + 1);
        Ok(())
    }

    /// Write a run of elements starting at `index`, growing if needed
    pub fn set_all(&mut self, index: u32, values: &[T]) -> Result<()> {
        let len = u32::try_from(values.len()).map_err(|_| Error::OutOfMemory)?;
        let end = index.checked_add(len).ok_or(Error::OutOfMemory)?;
        if end > self.capacity()? {
            self.reserve(end)?;
        }
        let count = self.count as usize;
        let storage = self.storage_mut()?;
        if index as usize > count {
            storage[count..index as usize].fill(T::default());
        }
        storage[index as usize..end as usize].copy_from_slice(values);
        self.count = self.count.max(end);
        Ok(())
    }

    /// Read the element at `index`
    ///
    /// Slots in `[count, capacity)` return `T::default()`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= capacity`.
    pub fn get(&self, index: u32) -> Result<T> {
        let storage = self.storage()?;
        let capacity = storage.len() as u32;
        if index >= capacity {
            return Err(Error::IndexOutOfRange { index, capacity });
        }
        if index < self.count {
            Ok(storage[index as usize])
        } else {
            Ok(T::default())
        }
    }

    /// Overwrite the slot at `index` without growing
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index >= capacity`.
    pub fn put(&mut self, index: u32, value: T) -> Result<()> {
        let capacity = self.capacity()?;
        if index >= capacity {
            return Err(Error::IndexOutOfRange { index, capacity });
        }
        self.set(index, value)
    }

    /// Reset `count` to zero, keeping capacity
    pub fn clear(&mut self) -> Result<()> {
        self.storage()?;
        self.count = 0;
        Ok(())
    }

    /// Live elements `[0, count)`
    pub fn as_slice(&self) -> Result<&[T]> {
        let count = self.count as usize;
        Ok(&self.storage()?[..count])
    }

    /// Iterate over the live elements
    pub fn iter(&self) -> Result<std::slice::Iter<'_, T>> {
        Ok(self.as_slice()?.iter())
    }

    /// Raw pointer to the backing block (invalidated by growth)
    pub fn as_ptr(&self) -> Result<*const T> {
        Ok(self.storage()?.as_ptr())
    }

    /// Release the backing block; every later call fails with `Disposed`
    pub fn dispose(&mut self) -> Result<()> {
        self.storage.take().ok_or(Error::Disposed("NativeBuffer"))?;
        self.count = 0;
        Ok(())
    }

    /// Whether [`NativeBuffer::dispose`] has been called
    pub fn is_disposed(&self) -> bool {
        self.storage.is_none()
    }
}

impl<T: BufferElement> Default for NativeBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: BufferElement + bytemuck::Pod> NativeBuffer<T> {
    /// Live elements as raw bytes, for upload to the backend
    pub fn as_bytes(&self) -> Result<&[u8]> {
        Ok(bytemuck::cast_slice(self.as_slice()?))
    }
}

#[cfg(test)]
#[path = "native_buffer_tests.rs"]
mod tests;
