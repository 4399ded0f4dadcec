/// Opaque native handles and their scoped ownership.
///
/// Every object a backend creates is identified by a [`NativeHandle`]. The
/// host-side wrapper that created it holds the only [`OwnedHandle`] for it,
/// and dropping that wrapper destroys the backend object.

use std::fmt;
use crate::render::backend::SharedBackend;

/// Opaque identifier of a backend object
///
/// `NULL` (0) is never handed out by a backend; it stands for "absent" in
/// flat descriptors and command records.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct NativeHandle(u64);

impl NativeHandle {
    pub const NULL: NativeHandle = NativeHandle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Sole owner of one backend object
///
/// Destroys the object on drop, on every exit path.
pub struct OwnedHandle {
    raw: NativeHandle,
    backend: SharedBackend,
}

impl OwnedHandle {
    pub(crate) fn new(raw: NativeHandle, backend: SharedBackend) -> Self {
        Self { raw, backend }
    }

    /// The handle as known by the backend
    pub fn raw(&self) -> NativeHandle {
        self.raw
    }

    /// The backend that owns the object
    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if let Ok(mut backend) = self.backend.lock() {
            backend.destroy(self.raw);
        }
    }
}

impl fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedHandle").field(&self.raw).finish()
    }
}
