/*!
# Strata Render

Host-side core of the Strata cross-backend rendering platform.

Application code describes render targets, render passes, pipeline state and
per-frame draw work through builders; this crate turns those descriptions
into flat descriptors and a packed command stream handed to a native backend.
Backends (the `headless` reference backend, GPU backends) are selected at
runtime through the plugin registry.

## Architecture

- **NativeBuffer / BufferPool**: growable typed arenas, recycled per element type
- **FormatDescriptor**: (numeric type, offset) layout of vertex/instance/uniform shapes
- **FramebufferFormat**: compiled render-pass graph (attachments, stages, dependencies)
- **RenderPipeline**: fixed-function + shader state bound to one stage
- **CommandBuffer / CommandBufferRecorder**: commit-once command stream encoder
- **RenderBackend**: trait implemented by native backends
*/

// Internal modules
mod error;
mod platform;
pub mod log;
pub mod util;
pub mod render;

// Main strata namespace module
pub mod strata {
    // Error types
    pub use crate::error::{Error, Result};

    // Platform facade
    pub use crate::platform::{Platform, PlatformConfig};

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::render::*;
    }

    // Arena, pool and layout utilities
    pub mod util {
        pub use crate::util::*;
    }
}

// Re-export math and plain-data libraries at crate root
pub use glam;
pub use bytemuck;
