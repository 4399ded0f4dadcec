/// RenderContext - front door to an opened backend
///
/// Cheap to clone; every object it creates keeps the backend alive and
/// destroys its own backend object when dropped.

use std::fmt;
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::command_buffer::CommandBuffer;
use crate::render::framebuffer::{Framebuffer, RenderTarget};
use crate::render::framebuffer_format::{FramebufferFormat, FramebufferFormatBuilder, RenderStage};
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::render::pipeline::RenderPipelineBuilder;
use crate::render::render_state::{RasterMode, Topology};
use crate::render::shader::{FragmentShader, FragmentStage, Shader, ShaderBuilder, ShaderKind, SamplerSlot, UniformSlot, VertexShader, VertexStage};
use crate::render::texture::{SamplerDescriptor, Texture, TextureBinding, TextureSampler};
use crate::render::uniform::{UniformBinding, UniformBuffer};
use crate::render::vertex_buffer::{VertexBuffer, WritableVertexBuffer};
use crate::util::{FormatLayout, NativeBuffer};

/// Opened render backend
#[derive(Clone)]
pub struct RenderContext {
    backend: SharedBackend,
}

impl RenderContext {
    /// Wrap a backend opened directly rather than through the plugin registry
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    pub(crate) fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    // ===== Render-pass graph =====

    /// Start declaring a framebuffer format
    pub fn create_framebuffer_format(&self) -> FramebufferFormatBuilder {
        FramebufferFormatBuilder::new(self.backend.clone())
    }

    /// Instantiate `format` at `width` x `height`
    pub fn create_framebuffer(&self, format: &Arc<FramebufferFormat>, width: u32, height: u32) -> Result<Framebuffer> {
        Framebuffer::create(&self.backend, format, width, height)
    }

    // ===== Shaders & pipelines =====

    /// Start declaring a vertex shader from opaque byte code
    pub fn create_vertex_shader(&self, code: &[u8]) -> ShaderBuilder<VertexStage> {
        ShaderBuilder::new(self.backend.clone(), code)
    }

    /// Start declaring a fragment shader from opaque byte code
    pub fn create_fragment_shader(&self, code: &[u8]) -> ShaderBuilder<FragmentStage> {
        ShaderBuilder::new(self.backend.clone(), code)
    }

    /// Start declaring a pipeline for vertex shape `V` rendering in `stage`
    pub fn create_pipeline<V: FormatLayout>(
        &self,
        vertex_shader: &VertexShader,
        fragment_shader: &FragmentShader,
        stage: &RenderStage,
        topology: Topology,
        raster_mode: RasterMode,
        discard_raster: bool,
    ) -> Result<RenderPipelineBuilder<V>> {
        RenderPipelineBuilder::new(
            self.backend.clone(),
            vertex_shader,
            fragment_shader,
            stage,
            topology,
            raster_mode,
            discard_raster,
        )
    }

    /// Start declaring a pipeline reading vertex shape `V` and instance shape `I`
    pub fn create_instanced_pipeline<V: FormatLayout, I: FormatLayout>(
        &self,
        vertex_shader: &VertexShader,
        fragment_shader: &FragmentShader,
        stage: &RenderStage,
        topology: Topology,
        raster_mode: RasterMode,
        discard_raster: bool,
    ) -> Result<RenderPipelineBuilder<V, I>> {
        self.create_pipeline::<V>(vertex_shader, fragment_shader, stage, topology, raster_mode, discard_raster)?
            .instanced::<I>()
    }

    // ===== Buffers =====

    /// Vertex buffer initialized from `[0, count)` of `initial`
    pub fn create_vertex_buffer<V: FormatLayout>(&self, initial: &NativeBuffer<V>) -> Result<VertexBuffer<V>> {
        VertexBuffer::create(&self.backend, initial, false)
    }

    /// Vertex buffer whose contents can be rewritten later
    pub fn create_writable_vertex_buffer<V: FormatLayout>(&self, initial: &NativeBuffer<V>) -> Result<WritableVertexBuffer<V>> {
        VertexBuffer::create(&self.backend, initial, true).map(WritableVertexBuffer::new)
    }

    /// Uniform buffer for `slot` of `shader`, initialized from `initial`
    pub fn create_uniform_buffer<K: ShaderKind, U: FormatLayout>(
        &self,
        shader: &Shader<K>,
        slot: UniformSlot<U>,
        initial: &NativeBuffer<U>,
    ) -> Result<UniformBuffer<U>> {
        let binding = shader.uniform_binding(slot)?;
        let shader_handle = shader.handle();
        let data = initial.as_bytes()?;
        let raw = with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.create_uniform_buffer(shader_handle, binding, data)
        })?;
        Ok(UniformBuffer::new(self.own(raw), binding, initial.count()?))
    }

    /// Attach `buffer` (or nothing yet) to `slot` of `shader`
    pub fn create_uniform_binding<K: ShaderKind, U: FormatLayout>(
        &self,
        shader: &Shader<K>,
        slot: UniformSlot<U>,
        buffer: Option<&UniformBuffer<U>>,
    ) -> Result<UniformBinding> {
        let binding = shader.uniform_binding(slot)?;
        if let Some(buffer) = buffer {
            if buffer.binding() != binding {
                return Err(crate::strata_fail!(
                    "strata::RenderContext",
                    Error::InvalidArgument(format!(
                        "Uniform buffer {} was created for binding {}, not {}",
                        buffer.handle(), buffer.binding(), binding
                    ))
                ));
            }
        }

        let shader_handle = shader.handle();
        let buffer = buffer.map_or(NativeHandle::NULL, UniformBuffer::handle);
        let raw = with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.create_uniform_binding(shader_handle, binding, buffer)
        })?;
        Ok(UniformBinding::new(self.own(raw), binding))
    }

    // ===== Textures =====

    /// RGBA8 texture from `width * height * 4` bytes
    pub fn create_texture(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Texture> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(crate::strata_fail!(
                "strata::RenderContext",
                Error::InvalidArgument(format!(
                    "Texture {}x{} needs {} bytes of RGBA8 data, got {}",
                    width, height, expected, rgba.len()
                ))
            ));
        }

        let raw = with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.create_texture(width, height, rgba)
        })?;
        Ok(Texture::owned(self.own(raw)))
    }

    pub fn create_texture_sampler(&self, descriptor: SamplerDescriptor) -> Result<TextureSampler> {
        let raw = with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.create_texture_sampler(&descriptor)
        })?;
        Ok(TextureSampler::new(self.own(raw), descriptor))
    }

    /// Join `slot` of `shader` with a sampler and a texture (either may come later)
    pub fn create_texture_binding<K: ShaderKind>(
        &self,
        shader: &Shader<K>,
        slot: SamplerSlot,
        sampler: Option<&TextureSampler>,
        texture: Option<&Texture>,
    ) -> Result<TextureBinding> {
        let binding = shader.sampler_binding(slot)?;
        let shader_handle = shader.handle();
        let sampler = sampler.map_or(NativeHandle::NULL, TextureSampler::handle);
        let texture = texture.map_or(NativeHandle::NULL, Texture::handle);
        let raw = with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.create_texture_binding(shader_handle, binding, sampler, texture)
        })?;
        Ok(TextureBinding::new(self.own(raw), binding))
    }

    // ===== Command submission =====

    pub fn create_command_buffer(&self) -> Result<CommandBuffer> {
        let raw = with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.create_command_buffer()
        })?;
        Ok(CommandBuffer::new(self.own(raw)))
    }

    /// Schedule a committed command buffer against `target`
    pub fn enqueue(&self, target: &dyn RenderTarget, command_buffer: &CommandBuffer) -> Result<()> {
        if command_buffer.is_recording() {
            return Err(crate::strata_fail!(
                "strata::RenderContext",
                Error::InvalidArgument(format!(
                    "Command buffer {} is still recording",
                    command_buffer.handle()
                ))
            ));
        }

        let target = target.target_handle();
        let command_buffer = command_buffer.handle();
        with_backend(&self.backend, "strata::RenderContext", |backend| {
            backend.enqueue(target, command_buffer)
        })
    }

    fn own(&self, raw: NativeHandle) -> OwnedHandle {
        OwnedHandle::new(raw, self.backend.clone())
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
