/// Framebuffers and the render target abstraction.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::framebuffer_format::{Attachment, FramebufferFormat};
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::render::texture::Texture;

/// Anything a command buffer can be enqueued against
///
/// Implemented by [`Framebuffer`]; window surfaces owned by a backend
/// implement it on their side.
pub trait RenderTarget {
    /// Backend handle of the target
    fn target_handle(&self) -> NativeHandle;

    /// Current (width, height) in pixels
    fn target_size(&self) -> Result<(u32, u32)>;
}

/// A framebuffer format instantiated at a given size
///
/// Holds one texture per attachment of its format; the textures are owned
/// by the framebuffer on the backend side.
#[derive(Debug)]
pub struct Framebuffer {
    handle: OwnedHandle,
    format: Arc<FramebufferFormat>,
    textures: Vec<Texture>,
}

impl Framebuffer {
    pub(crate) fn create(backend: &SharedBackend, format: &Arc<FramebufferFormat>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(crate::strata_fail!(
                "strata::Framebuffer",
                Error::InvalidArgument(format!("Invalid framebuffer size {}x{}", width, height))
            ));
        }

        let format_handle = format.handle();
        let attachment_count = format.attachment_count() as u32;

        let (raw, textures) = with_backend(backend, "strata::Framebuffer", |backend| {
            let raw = backend.create_framebuffer(format_handle, width, height)?;
            let textures = (0..attachment_count)
                .map(|attachment| backend.framebuffer_texture(raw, attachment))
                .collect::<Result<Vec<_>>>();
            match textures {
                Ok(textures) => Ok((raw, textures)),
                Err(error) => {
                    backend.destroy(raw);
                    Err(error)
                }
            }
        })?;

        crate::strata_debug!(
            "strata::Framebuffer",
            "Created framebuffer {} ({}x{}, {} attachments) on format {}",
            raw, width, height, attachment_count, format_handle
        );

        Ok(Self {
            handle: OwnedHandle::new(raw, backend.clone()),
            format: format.clone(),
            textures: textures
                .into_iter()
                .map(|texture| Texture::attachment(texture, backend.clone()))
                .collect(),
        })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    pub fn format(&self) -> &Arc<FramebufferFormat> {
        &self.format
    }

    /// (width, height) as reported by the backend
    pub fn size(&self) -> Result<(u32, u32)> {
        let handle = self.handle();
        with_backend(self.handle.backend(), "strata::Framebuffer", |backend| backend.framebuffer_size(handle))
    }

    pub fn width(&self) -> Result<u32> {
        Ok(self.size()?.0)
    }

    pub fn height(&self) -> Result<u32> {
        Ok(self.size()?.1)
    }

    /// One texture per attachment, indexed by attachment id
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Texture backing `attachment` of this framebuffer's format
    pub fn texture(&self, attachment: &Attachment) -> Result<&Texture> {
        if !attachment.belongs_to(&self.format) {
            return Err(crate::strata_fail!(
                "strata::Framebuffer",
                Error::InvalidArgument(format!(
                    "Attachment {} does not belong to the format of framebuffer {}",
                    attachment.id(), self.handle()
                ))
            ));
        }
        Ok(&self.textures[attachment.id() as usize])
    }
}

impl RenderTarget for Framebuffer {
    fn target_handle(&self) -> NativeHandle {
        self.handle()
    }

    fn target_size(&self) -> Result<(u32, u32)> {
        self.size()
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
