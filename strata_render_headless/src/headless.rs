/// Headless backend - CPU-side implementation of RenderBackend
///
/// Objects live in one slot map; a handle is the slot map key's FFI form.
/// Committed command streams are copied out of the host arena and kept
/// per command buffer, and every enqueue is recorded as a [`Submission`].

use std::sync::{Arc, Mutex};
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use strata_render::strata::{Error, PlatformConfig, Result};
use strata_render::strata::render::{
    AttachmentDescriptor, BindingDescriptor, CommandRecord, NativeHandle, PipelineDescriptor,
    RenderBackend, RenderStageDescriptor, SamplerDescriptor, SharedBackend, ShaderStage,
};
use strata_render::strata::util::NumericType;
use crate::validation::{self, ValidationStats, ValidationTracker};

new_key_type! {
    struct ObjectKey;
}

fn handle_of(key: ObjectKey) -> NativeHandle {
    NativeHandle::from_raw(key.data().as_ffi())
}

fn key_of(handle: NativeHandle) -> ObjectKey {
    KeyData::from_ffi(handle.raw()).into()
}

// ============================================================================
// Objects
// ============================================================================

/// The four flat arrays a framebuffer format was compiled from
#[derive(Debug, Clone, PartialEq)]
pub struct FormatArrays {
    pub attachments: Vec<AttachmentDescriptor>,
    pub stages: Vec<RenderStageDescriptor>,
    pub members: Vec<u32>,
    pub dependencies: Vec<u32>,
}

/// One enqueued command buffer, with the records it held at enqueue time
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: NativeHandle,
    pub command_buffer: NativeHandle,
    pub records: Vec<CommandRecord>,
}

enum Object {
    Format(FormatArrays),
    Framebuffer {
        format: NativeHandle,
        width: u32,
        height: u32,
        textures: Vec<NativeHandle>,
    },
    Texture {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        /// Owning framebuffer, `NULL` for standalone textures
        framebuffer: NativeHandle,
    },
    Shader {
        stage: ShaderStage,
        bindings: Vec<BindingDescriptor>,
    },
    Pipeline {
        format: NativeHandle,
        instanced: bool,
    },
    VertexBuffer {
        data: Vec<u8>,
        writable: bool,
    },
    UniformBuffer {
        block_size: u32,
        data: Vec<u8>,
    },
    UniformBinding {
        buffer: NativeHandle,
    },
    Sampler(SamplerDescriptor),
    TextureBinding {
        sampler: NativeHandle,
        texture: NativeHandle,
    },
    CommandBuffer {
        /// `NULL` until the first commit
        format: NativeHandle,
        records: Vec<CommandRecord>,
    },
}

impl Object {
    fn kind(&self) -> &'static str {
        match self {
            Object::Format(_) => "framebuffer format",
            Object::Framebuffer { .. } => "framebuffer",
            Object::Texture { .. } => "texture",
            Object::Shader { .. } => "shader",
            Object::Pipeline { .. } => "pipeline",
            Object::VertexBuffer { .. } => "vertex buffer",
            Object::UniformBuffer { .. } => "uniform buffer",
            Object::UniformBinding { .. } => "uniform binding",
            Object::Sampler(_) => "sampler",
            Object::TextureBinding { .. } => "texture binding",
            Object::CommandBuffer { .. } => "command buffer",
        }
    }
}

// ============================================================================
// HeadlessBackend
// ============================================================================

/// Reference backend without a GPU
pub struct HeadlessBackend {
    objects: SlotMap<ObjectKey, Object>,
    submissions: Vec<Submission>,
    validation_enabled: bool,
    tracker: ValidationTracker,
}

impl HeadlessBackend {
    /// Create a headless backend
    ///
    /// Validation runs when `config.enable_validation` is set or the crate is
    /// built with the `strict-validation` feature.
    pub fn new(config: &PlatformConfig) -> Self {
        let validation_enabled = config.enable_validation || cfg!(feature = "strict-validation");
        strata_render::strata_info!(
            "strata::Headless",
            "Headless backend opened for '{}' v{}.{}.{} (validation {})",
            config.app_name,
            config.app_version.0,
            config.app_version.1,
            config.app_version.2,
            if validation_enabled { "on" } else { "off" }
        );

        Self {
            objects: SlotMap::with_key(),
            submissions: Vec::new(),
            validation_enabled,
            tracker: ValidationTracker::default(),
        }
    }

    /// Create a backend behind its own lock
    ///
    /// The returned handle and `as_shared` of it point to the same backend,
    /// so a caller can open a context and still inspect what it received.
    pub fn shared(config: &PlatformConfig) -> Arc<Mutex<HeadlessBackend>> {
        Arc::new(Mutex::new(Self::new(config)))
    }

    /// View a typed backend as the trait object a context expects
    pub fn as_shared(backend: &Arc<Mutex<HeadlessBackend>>) -> SharedBackend {
        backend.clone()
    }

    // ===== Inspection =====

    pub fn validation_enabled(&self) -> bool {
        self.validation_enabled
    }

    pub fn validation_stats(&self) -> ValidationStats {
        self.tracker.stats()
    }

    /// Print every validation failure seen so far
    pub fn print_validation_report(&self) {
        self.tracker.print_report();
    }

    /// Number of backend objects alive (framebuffer textures included)
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Every enqueue, in order
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Arrays a framebuffer format was compiled from
    pub fn format_arrays(&self, format: NativeHandle) -> Result<&FormatArrays> {
        match self.get(format)? {
            Object::Format(arrays) => Ok(arrays),
            other => Err(wrong_kind(format, "framebuffer format", other)),
        }
    }

    /// Records of the last commit of `command_buffer`
    pub fn committed_records(&self, command_buffer: NativeHandle) -> Result<&[CommandRecord]> {
        match self.get(command_buffer)? {
            Object::CommandBuffer { records, .. } => Ok(records),
            other => Err(wrong_kind(command_buffer, "command buffer", other)),
        }
    }

    /// Format of the last commit of `command_buffer` (`NULL` if never committed)
    pub fn committed_format(&self, command_buffer: NativeHandle) -> Result<NativeHandle> {
        match self.get(command_buffer)? {
            Object::CommandBuffer { format, .. } => Ok(*format),
            other => Err(wrong_kind(command_buffer, "command buffer", other)),
        }
    }

    /// Current contents of a vertex buffer
    pub fn vertex_buffer_data(&self, buffer: NativeHandle) -> Result<&[u8]> {
        match self.get(buffer)? {
            Object::VertexBuffer { data, .. } => Ok(data),
            other => Err(wrong_kind(buffer, "vertex buffer", other)),
        }
    }

    /// Current contents of a uniform buffer
    pub fn uniform_buffer_data(&self, buffer: NativeHandle) -> Result<&[u8]> {
        match self.get(buffer)? {
            Object::UniformBuffer { data, .. } => Ok(data),
            other => Err(wrong_kind(buffer, "uniform buffer", other)),
        }
    }

    /// Pixels of a standalone texture (empty for framebuffer attachments)
    pub fn texture_pixels(&self, texture: NativeHandle) -> Result<&[u8]> {
        match self.get(texture)? {
            Object::Texture { rgba, .. } => Ok(rgba),
            other => Err(wrong_kind(texture, "texture", other)),
        }
    }

    pub fn sampler_descriptor(&self, sampler: NativeHandle) -> Result<SamplerDescriptor> {
        match self.get(sampler)? {
            Object::Sampler(descriptor) => Ok(*descriptor),
            other => Err(wrong_kind(sampler, "sampler", other)),
        }
    }

    /// (sampler, texture) currently joined by a texture binding
    pub fn texture_binding(&self, binding: NativeHandle) -> Result<(NativeHandle, NativeHandle)> {
        match self.get(binding)? {
            Object::TextureBinding { sampler, texture } => Ok((*sampler, *texture)),
            other => Err(wrong_kind(binding, "texture binding", other)),
        }
    }

    // ===== Internal helpers =====

    fn insert(&mut self, object: Object) -> NativeHandle {
        handle_of(self.objects.insert(object))
    }

    fn get(&self, handle: NativeHandle) -> Result<&Object> {
        if handle.is_null() {
            return Err(Error::InvalidResource("NULL handle".to_string()));
        }
        self.objects
            .get(key_of(handle))
            .ok_or_else(|| Error::InvalidResource(format!("Unknown handle {}", handle)))
    }

    fn get_mut(&mut self, handle: NativeHandle) -> Result<&mut Object> {
        if handle.is_null() {
            return Err(Error::InvalidResource("NULL handle".to_string()));
        }
        self.objects
            .get_mut(key_of(handle))
            .ok_or_else(|| Error::InvalidResource(format!("Unknown handle {}", handle)))
    }

    /// `NULL`, or a live object of `kind`
    fn expect_optional(&self, handle: NativeHandle, kind: &'static str) -> Result<()> {
        if handle.is_null() {
            return Ok(());
        }
        let object = self.get(handle)?;
        if object.kind() != kind {
            return Err(wrong_kind(handle, kind, object));
        }
        Ok(())
    }

    fn shader_bindings(&self, shader: NativeHandle) -> Result<(ShaderStage, &[BindingDescriptor])> {
        match self.get(shader)? {
            Object::Shader { stage, bindings } => Ok((*stage, bindings)),
            other => Err(wrong_kind(shader, "shader", other)),
        }
    }

    /// Run one validation check when validation is enabled
    fn validate(&mut self, check: impl FnOnce(&Self) -> std::result::Result<(), String>) -> Result<()> {
        if !self.validation_enabled {
            return Ok(());
        }
        let outcome = check(self);
        self.tracker
            .record(outcome)
            .map_err(|message| Error::BackendError(format!("Validation: {}", message)))
    }

    fn kind_of(&self, handle: NativeHandle) -> Option<&'static str> {
        if handle.is_null() {
            return None;
        }
        self.objects.get(key_of(handle)).map(Object::kind)
    }

    fn require(&self, handle: NativeHandle, kind: &'static str, what: &str) -> std::result::Result<(), String> {
        match self.kind_of(handle) {
            Some(found) if found == kind => Ok(()),
            Some(found) => Err(format!("{} {} is a {}, expected a {}", what, handle, found, kind)),
            None => Err(format!("{} {} is not a live {}", what, handle, kind)),
        }
    }

    /// Check every handle of a command stream against `format`
    fn check_commands(&self, format: NativeHandle, commands: &[CommandRecord]) -> std::result::Result<(), String> {
        for (index, command) in commands.iter().enumerate() {
            let context = |message: String| format!("Record {}: {}", index, message);
            match *command {
                CommandRecord::SetViewportAndScissorFromTarget { target } => {
                    self.require(target, "framebuffer", "target").map_err(context)?;
                }
                CommandRecord::SetViewport(_) | CommandRecord::SetScissor(_) => {}
                CommandRecord::BindUniform { pipeline, binding, index: element } => {
                    self.check_pipeline(pipeline, format).map_err(context)?;
                    self.require(binding, "uniform binding", "binding").map_err(context)?;
                    if let Some(Object::UniformBinding { buffer }) = self.objects.get(key_of(binding)) {
                        if let Some(Object::UniformBuffer { block_size, data }) =
                            (!buffer.is_null()).then(|| self.objects.get(key_of(*buffer))).flatten()
                        {
                            let count = data.len() as u32 / (*block_size).max(1);
                            if element >= count {
                                return Err(context(format!(
                                    "uniform element {} out of range ({} bound)",
                                    element, count
                                )));
                            }
                        }
                    }
                }
                CommandRecord::BindTexture { pipeline, binding } => {
                    self.check_pipeline(pipeline, format).map_err(context)?;
                    self.require(binding, "texture binding", "binding").map_err(context)?;
                    if let Some(Object::TextureBinding { sampler, texture }) = self.objects.get(key_of(binding)) {
                        if sampler.is_null() || texture.is_null() {
                            return Err(context(format!("texture binding {} has no sampler or texture", binding)));
                        }
                    }
                }
                CommandRecord::Draw { pipeline, vertex_buffer, instance_buffer } => {
                    self.check_pipeline(pipeline, format).map_err(context)?;
                    self.require(vertex_buffer, "vertex buffer", "vertex buffer").map_err(context)?;
                    let instanced = matches!(
                        self.objects.get(key_of(pipeline)),
                        Some(Object::Pipeline { instanced: true, .. })
                    );
                    match (instanced, instance_buffer.is_null()) {
                        (true, true) => return Err(context("instanced pipeline drawn without instances".to_string())),
                        (false, false) => return Err(context("instance buffer given to a non-instanced pipeline".to_string())),
                        (true, false) => {
                            self.require(instance_buffer, "vertex buffer", "instance buffer").map_err(context)?;
                        }
                        (false, true) => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn check_pipeline(&self, pipeline: NativeHandle, format: NativeHandle) -> std::result::Result<(), String> {
        self.require(pipeline, "pipeline", "pipeline")?;
        match self.objects.get(key_of(pipeline)) {
            Some(Object::Pipeline { format: compiled, .. }) if *compiled != format => Err(format!(
                "pipeline {} was compiled for format {}, stream is for {}",
                pipeline, compiled, format
            )),
            _ => Ok(()),
        }
    }
}

fn wrong_kind(handle: NativeHandle, expected: &str, found: &Object) -> Error {
    Error::InvalidResource(format!("Handle {} is a {}, not a {}", handle, found.kind(), expected))
}

// ============================================================================
// RenderBackend implementation
// ============================================================================

impl RenderBackend for HeadlessBackend {
    fn create_framebuffer_format(
        &mut self,
        attachments: &[AttachmentDescriptor],
        stages: &[RenderStageDescriptor],
        members: &[u32],
        dependencies: &[u32],
    ) -> Result<NativeHandle> {
        self.validate(|_| validation::validate_graph(attachments, stages, members, dependencies))?;

        let handle = self.insert(Object::Format(FormatArrays {
            attachments: attachments.to_vec(),
            stages: stages.to_vec(),
            members: members.to_vec(),
            dependencies: dependencies.to_vec(),
        }));
        strata_render::strata_debug!(
            "strata::Headless",
            "Framebuffer format {}: {} attachments, {} stages",
            handle, attachments.len(), stages.len()
        );
        Ok(handle)
    }

    fn create_framebuffer(&mut self, format: NativeHandle, width: u32, height: u32) -> Result<NativeHandle> {
        let attachment_count = self.format_arrays(format)?.attachments.len();
        if width == 0 || height == 0 {
            return Err(Error::InvalidArgument(format!("Framebuffer size {}x{}", width, height)));
        }

        let handle = self.insert(Object::Framebuffer { format, width, height, textures: Vec::new() });
        let textures: Vec<NativeHandle> = (0..attachment_count)
            .map(|_| self.insert(Object::Texture { width, height, rgba: Vec::new(), framebuffer: handle }))
            .collect();
        if let Some(Object::Framebuffer { textures: owned, .. }) = self.objects.get_mut(key_of(handle)) {
            *owned = textures;
        }
        Ok(handle)
    }

    fn framebuffer_size(&self, framebuffer: NativeHandle) -> Result<(u32, u32)> {
        match self.get(framebuffer)? {
            Object::Framebuffer { width, height, .. } => Ok((*width, *height)),
            other => Err(wrong_kind(framebuffer, "framebuffer", other)),
        }
    }

    fn framebuffer_texture(&self, framebuffer: NativeHandle, attachment: u32) -> Result<NativeHandle> {
        match self.get(framebuffer)? {
            Object::Framebuffer { textures, .. } => textures.get(attachment as usize).copied().ok_or_else(|| {
                Error::InvalidResource(format!("Framebuffer {} has no attachment {}", framebuffer, attachment))
            }),
            other => Err(wrong_kind(framebuffer, "framebuffer", other)),
        }
    }

    fn create_shader(
        &mut self,
        stage: ShaderStage,
        _code: &[u8],
        bindings: &[BindingDescriptor],
        uniform_members: &[NumericType],
    ) -> Result<NativeHandle> {
        self.validate(|_| validation::validate_bindings(bindings, uniform_members))?;
        Ok(self.insert(Object::Shader { stage, bindings: bindings.to_vec() }))
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor<'_>) -> Result<NativeHandle> {
        let arrays = self.format_arrays(desc.format)?;
        let stage_count = arrays.stages.len() as u32;
        let attachments = arrays.attachments.clone();
        let (vertex_stage, _) = self.shader_bindings(desc.vertex_shader)?;
        let (fragment_stage, _) = self.shader_bindings(desc.fragment_shader)?;

        self.validate(|_| {
            if desc.stage >= stage_count {
                return Err(format!("Pipeline stage {} out of {} stages", desc.stage, stage_count));
            }
            if vertex_stage != ShaderStage::Vertex || fragment_stage != ShaderStage::Fragment {
                return Err(format!(
                    "Pipeline shaders run in {:?}/{:?}, expected Vertex/Fragment",
                    vertex_stage, fragment_stage
                ));
            }
            validation::validate_layout("Vertex", desc.vertex_format, desc.vertex_stride)?;
            validation::validate_layout("Instance", desc.instance_format, desc.instance_stride)?;
            validation::validate_blend(desc.blend, &attachments)
        })?;

        let handle = self.insert(Object::Pipeline {
            format: desc.format,
            instanced: desc.instance_stride != 0,
        });
        strata_render::strata_debug!(
            "strata::Headless",
            "Pipeline {} for stage {} of format {}",
            handle, desc.stage, desc.format
        );
        Ok(handle)
    }

    fn create_vertex_buffer(&mut self, data: &[u8], vertex_size: u32, writable: bool) -> Result<NativeHandle> {
        self.validate(|_| match vertex_size {
            0 => Err("Vertex size is 0".to_string()),
            size if data.len() % size as usize != 0 => {
                Err(format!("{} bytes is not a whole number of {}-byte vertices", data.len(), size))
            }
            _ => Ok(()),
        })?;
        Ok(self.insert(Object::VertexBuffer { data: data.to_vec(), writable }))
    }

    fn write_vertex_buffer(&mut self, buffer: NativeHandle, data: &[u8]) -> Result<()> {
        match self.get_mut(buffer)? {
            Object::VertexBuffer { data: contents, writable: true } => {
                *contents = data.to_vec();
                Ok(())
            }
            Object::VertexBuffer { .. } => {
                Err(Error::InvalidResource(format!("Vertex buffer {} is not writable", buffer)))
            }
            other => Err(wrong_kind(buffer, "vertex buffer", other)),
        }
    }

    fn create_uniform_buffer(&mut self, shader: NativeHandle, binding: u32, data: &[u8]) -> Result<NativeHandle> {
        let (_, bindings) = self.shader_bindings(shader)?;
        let block_size = match bindings.get(binding as usize) {
            Some(BindingDescriptor::Uniform { size, .. }) => *size,
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "Binding {} of shader {} is not a uniform block",
                    binding, shader
                )))
            }
        };

        self.validate(|_| {
            if block_size == 0 || data.len() % block_size as usize != 0 {
                return Err(format!("{} bytes is not a whole number of {}-byte blocks", data.len(), block_size));
            }
            Ok(())
        })?;
        Ok(self.insert(Object::UniformBuffer { block_size, data: data.to_vec() }))
    }

    fn write_uniform_buffer(&mut self, buffer: NativeHandle, data: &[u8]) -> Result<()> {
        match self.get_mut(buffer)? {
            Object::UniformBuffer { data: contents, .. } => {
                *contents = data.to_vec();
                Ok(())
            }
            other => Err(wrong_kind(buffer, "uniform buffer", other)),
        }
    }

    fn create_uniform_binding(&mut self, shader: NativeHandle, binding: u32, buffer: NativeHandle) -> Result<NativeHandle> {
        let (_, bindings) = self.shader_bindings(shader)?;
        let slot = bindings.get(binding as usize).copied();
        self.expect_optional(buffer, "uniform buffer")?;

        self.validate(|backend| {
            let Some(BindingDescriptor::Uniform { size, .. }) = slot else {
                return Err(format!("Binding {} of shader {} is not a uniform block", binding, shader));
            };
            match backend.objects.get(key_of(buffer)) {
                Some(Object::UniformBuffer { block_size, .. }) if !buffer.is_null() && *block_size != size => Err(
                    format!("Uniform buffer {} holds {}-byte blocks, slot expects {}", buffer, block_size, size),
                ),
                _ => Ok(()),
            }
        })?;
        Ok(self.insert(Object::UniformBinding { buffer }))
    }

    fn update_uniform_binding(&mut self, binding: NativeHandle, buffer: NativeHandle) -> Result<()> {
        self.expect_optional(buffer, "uniform buffer")?;
        match self.get_mut(binding)? {
            Object::UniformBinding { buffer: bound } => {
                *bound = buffer;
                Ok(())
            }
            other => Err(wrong_kind(binding, "uniform binding", other)),
        }
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<NativeHandle> {
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(Error::InvalidArgument(format!(
                "Texture {}x{} with {} bytes of RGBA8 data",
                width, height, rgba.len()
            )));
        }
        Ok(self.insert(Object::Texture {
            width,
            height,
            rgba: rgba.to_vec(),
            framebuffer: NativeHandle::NULL,
        }))
    }

    fn texture_size(&self, texture: NativeHandle) -> Result<(u32, u32)> {
        match self.get(texture)? {
            Object::Texture { width, height, .. } => Ok((*width, *height)),
            other => Err(wrong_kind(texture, "texture", other)),
        }
    }

    fn create_texture_sampler(&mut self, desc: &SamplerDescriptor) -> Result<NativeHandle> {
        self.validate(|_| {
            if desc.anisotropy_enabled && desc.max_anisotropy < 1.0 {
                return Err(format!("Max anisotropy {} below 1", desc.max_anisotropy));
            }
            Ok(())
        })?;
        Ok(self.insert(Object::Sampler(*desc)))
    }

    fn create_texture_binding(
        &mut self,
        shader: NativeHandle,
        binding: u32,
        sampler: NativeHandle,
        texture: NativeHandle,
    ) -> Result<NativeHandle> {
        let (_, bindings) = self.shader_bindings(shader)?;
        let slot = bindings.get(binding as usize).copied();
        self.expect_optional(sampler, "sampler")?;
        self.expect_optional(texture, "texture")?;

        self.validate(|_| match slot {
            Some(BindingDescriptor::Sampler) => Ok(()),
            _ => Err(format!("Binding {} of shader {} is not a sampler", binding, shader)),
        })?;
        Ok(self.insert(Object::TextureBinding { sampler, texture }))
    }

    fn update_texture_binding(&mut self, binding: NativeHandle, sampler: NativeHandle, texture: NativeHandle) -> Result<()> {
        self.expect_optional(sampler, "sampler")?;
        self.expect_optional(texture, "texture")?;
        match self.get_mut(binding)? {
            Object::TextureBinding { sampler: bound_sampler, texture: bound_texture } => {
                *bound_sampler = sampler;
                *bound_texture = texture;
                Ok(())
            }
            other => Err(wrong_kind(binding, "texture binding", other)),
        }
    }

    fn create_command_buffer(&mut self) -> Result<NativeHandle> {
        Ok(self.insert(Object::CommandBuffer { format: NativeHandle::NULL, records: Vec::new() }))
    }

    fn commit_command_buffer(
        &mut self,
        command_buffer: NativeHandle,
        format: NativeHandle,
        commands: &[CommandRecord],
    ) -> Result<()> {
        self.format_arrays(format)?;
        self.validate(|backend| backend.check_commands(format, commands))?;

        match self.get_mut(command_buffer)? {
            Object::CommandBuffer { format: committed, records } => {
                *committed = format;
                records.clear();
                records.extend_from_slice(commands);
            }
            other => return Err(wrong_kind(command_buffer, "command buffer", other)),
        }

        strata_render::strata_trace!(
            "strata::Headless",
            "Command buffer {} committed: {} records",
            command_buffer, commands.len()
        );
        Ok(())
    }

    fn enqueue(&mut self, target: NativeHandle, command_buffer: NativeHandle) -> Result<()> {
        let target_format = match self.get(target)? {
            Object::Framebuffer { format, .. } => *format,
            other => return Err(wrong_kind(target, "framebuffer", other)),
        };
        let (format, records) = match self.get(command_buffer)? {
            Object::CommandBuffer { format, records } => (*format, records.clone()),
            other => return Err(wrong_kind(command_buffer, "command buffer", other)),
        };

        self.validate(|_| {
            if format.is_null() {
                return Err(format!("Command buffer {} was never committed", command_buffer));
            }
            if format != target_format {
                return Err(format!(
                    "Command buffer {} was recorded for format {}, target {} uses {}",
                    command_buffer, format, target, target_format
                ));
            }
            Ok(())
        })?;

        self.submissions.push(Submission { target, command_buffer, records });
        Ok(())
    }

    fn destroy(&mut self, handle: NativeHandle) {
        let owner = match self.get(handle) {
            Ok(Object::Texture { framebuffer, .. }) => *framebuffer,
            Ok(_) => NativeHandle::NULL,
            Err(_) => {
                strata_render::strata_warn!("strata::Headless", "Destroy of unknown handle {}", handle);
                return;
            }
        };
        if !owner.is_null() {
            strata_render::strata_warn!(
                "strata::Headless",
                "Texture {} belongs to framebuffer {} and is not destroyed separately",
                handle, owner
            );
            return;
        }

        if let Some(Object::Framebuffer { textures, .. }) = self.objects.remove(key_of(handle)) {
            for texture in textures {
                self.objects.remove(key_of(texture));
            }
        }
    }
}

#[cfg(test)]
#[path = "headless_tests.rs"]
mod tests;
