/// Render module - all rendering-related types and traits

// Module declarations
pub mod backend;
pub mod handle;
pub mod render_state;
pub mod framebuffer_format;
pub mod framebuffer;
pub mod shader;
pub mod pipeline;
pub mod vertex_buffer;
pub mod uniform;
pub mod texture;
pub mod command_buffer;
pub mod context;

#[cfg(test)]
pub mod mock_backend;

// Re-export the backend surface
pub use backend::{
    RenderBackend, SharedBackend, BackendPluginRegistry,
    register_backend_plugin, create_backend, registered_backends, backend_plugin_registry,
};

// Re-export from other modules
pub use handle::*;
pub use render_state::*;
pub use framebuffer_format::*;
pub use framebuffer::*;
pub use shader::*;
pub use pipeline::*;
pub use vertex_buffer::*;
pub use uniform::*;
pub use texture::*;
pub use command_buffer::*;
pub use context::*;
