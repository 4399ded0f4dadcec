/// Utility module - native arenas, pooling and data layout description

pub mod native_buffer;
pub mod buffer_pool;
pub mod numeric_type;
pub mod format_descriptor;

pub use native_buffer::{NativeBuffer, BufferElement, GROWTH_QUANTUM, calculate_capacity};
pub use buffer_pool::{BufferPool, PooledBuffer};
pub use numeric_type::NumericType;
pub use format_descriptor::{FormatDescriptor, FormatElement, FormatLayout, FieldLayout};
