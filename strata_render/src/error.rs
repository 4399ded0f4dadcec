//! Error types for the Strata render platform
//!
//! Every fallible operation in the crate returns [`Result`]. Errors fall in
//! three families:
//! - protocol violations (recording after commit, use of a released pooled
//!   buffer, ...), which indicate a programming error in the caller
//! - validation failures, raised by builders before any backend object exists
//! - backend / resource failures, propagated as-is from the native backend

use std::fmt;

/// Result type for Strata operations
pub type Result<T> = std::result::Result<T, Error>;

/// Strata platform errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (native call failed, lock poisoned, ...)
    BackendError(String),

    /// Host or device memory exhausted (including capacity overflow)
    OutOfMemory,

    /// Handle unknown to the backend or already destroyed
    InvalidResource(String),

    /// Backend creation failed (unknown plugin, bad configuration)
    InitializationFailed(String),

    /// A builder argument was rejected before any native object was created
    InvalidArgument(String),

    /// A field type has no numeric type mapping
    UnsupportedFieldType(String),

    /// Two fields of a data layout share bytes
    OverlappingFields(String),

    /// Index past the capacity of a native buffer
    IndexOutOfRange {
        index: u32,
        capacity: u32,
    },

    /// Object used after disposal or release
    Disposed(&'static str),

    /// `begin_recording` called while a recording is already open
    AlreadyRecording,

    /// Recording call or commit on an already committed recording
    RecordingAlreadyCommitted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::UnsupportedFieldType(ty) => {
                write!(f, "Unsupported field type: the type must be a numeric type, got {}", ty)
            }
            Error::OverlappingFields(msg) => write!(f, "Overlapping fields: {}", msg),
            Error::IndexOutOfRange { index, capacity } => {
                write!(f, "Index {} out of range: not enough space in buffer (capacity {})", index, capacity)
            }
            Error::Disposed(object) => write!(f, "Cannot access a disposed object: {}", object),
            Error::AlreadyRecording => write!(f, "Command buffer is already being recorded to"),
            Error::RecordingAlreadyCommitted => write!(
                f,
                "Command buffer recording has already been committed and cannot be written to"
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
