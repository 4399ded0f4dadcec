/// Textures, samplers and texture bindings.

use std::fmt;
use crate::error::Result;
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::handle::{NativeHandle, OwnedHandle};

// ============================================================================
// Texture
// ============================================================================

enum TextureHandle {
    /// Created by the application, destroyed with the texture
    Owned(OwnedHandle),
    /// Framebuffer attachment, destroyed with its framebuffer
    Attachment { raw: NativeHandle, backend: SharedBackend },
}

/// RGBA8 texture
pub struct Texture {
    handle: TextureHandle,
}

impl Texture {
    pub(crate) fn owned(handle: OwnedHandle) -> Self {
        Self { handle: TextureHandle::Owned(handle) }
    }

    pub(crate) fn attachment(raw: NativeHandle, backend: SharedBackend) -> Self {
        Self { handle: TextureHandle::Attachment { raw, backend } }
    }

    pub fn handle(&self) -> NativeHandle {
        match &self.handle {
            TextureHandle::Owned(owned) => owned.raw(),
            TextureHandle::Attachment { raw, .. } => *raw,
        }
    }

    /// Whether the texture belongs to a framebuffer
    pub fn is_attachment(&self) -> bool {
        matches!(self.handle, TextureHandle::Attachment { .. })
    }

    /// (width, height) as reported by the backend
    pub fn size(&self) -> Result<(u32, u32)> {
        let handle = self.handle();
        with_backend(self.backend(), "strata::Texture", |backend| backend.texture_size(handle))
    }

    pub fn width(&self) -> Result<u32> {
        Ok(self.size()?.0)
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.size()?.1)
    }

    fn backend(&self) -> &SharedBackend {
        match &self.handle {
            TextureHandle::Owned(owned) => owned.backend(),
            TextureHandle::Attachment { backend, .. } => backend,
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle())
            .field("attachment", &self.is_attachment())
            .finish()
    }
}

// ============================================================================
// Sampler
// ============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFiltering {
    #[default]
    Linear,
    Nearest,
}

/// Addressing outside [0, 1]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrapping {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    MirroredClampToEdge,
    ClampToBorder,
}

/// Border color used by [`TextureWrapping::ClampToBorder`]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureBorderColor {
    TransparentBlack,
    #[default]
    OpaqueBlack,
    OpaqueWhite,
}

/// Sampler state, as handed to the backend
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplerDescriptor {
    pub min_filter: TextureFiltering,
    pub mag_filter: TextureFiltering,
    pub wrapping: TextureWrapping,
    pub border_color: TextureBorderColor,
    pub anisotropy_enabled: bool,
    pub max_anisotropy: f32,
}

impl SamplerDescriptor {
    pub fn new(min_filter: TextureFiltering, mag_filter: TextureFiltering, wrapping: TextureWrapping) -> Self {
        Self { min_filter, mag_filter, wrapping, ..Default::default() }
    }

    pub fn with_border_color(mut self, border_color: TextureBorderColor) -> Self {
        self.border_color = border_color;
        self
    }

    /// Enable anisotropic filtering at `level`
    pub fn with_anisotropy(mut self, level: f32) -> Self {
        self.anisotropy_enabled = true;
        self.max_anisotropy = level;
        self
    }
}

/// Compiled sampler state
#[derive(Debug)]
pub struct TextureSampler {
    handle: OwnedHandle,
    descriptor: SamplerDescriptor,
}

impl TextureSampler {
    pub(crate) fn new(handle: OwnedHandle, descriptor: SamplerDescriptor) -> Self {
        Self { handle, descriptor }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }
}

// ============================================================================
// Binding
// ============================================================================

/// A shader sampler slot joined with a sampler and a texture
///
/// Bound to a pipeline with `CommandBufferRecorder::bind_texture`.
#[derive(Debug)]
pub struct TextureBinding {
    handle: OwnedHandle,
    binding: u32,
}

impl TextureBinding {
    pub(crate) fn new(handle: OwnedHandle, binding: u32) -> Self {
        Self { handle, binding }
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    /// Shader binding slot
    pub fn binding(&self) -> u32 {
        self.binding
    }

    /// Point the binding at another sampler and/or texture
    pub fn update(&self, sampler: Option<&TextureSampler>, texture: Option<&Texture>) -> Result<()> {
        let handle = self.handle();
        let sampler = sampler.map_or(NativeHandle::NULL, TextureSampler::handle);
        let texture = texture.map_or(NativeHandle::NULL, Texture::handle);
        with_backend(self.handle.backend(), "strata::TextureBinding", |backend| {
            backend.update_texture_binding(handle, sampler, texture)
        })
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
