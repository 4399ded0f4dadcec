/// Mock backend for unit tests (no native code required)
///
/// Hands out sequential handles and records every call in a [`MockState`]
/// shared with the test, so host-side builders and encoders can be checked
/// against exactly what crossed the backend boundary.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::render::{
    AttachmentDescriptor, BindingDescriptor, BlendOptions, CommandRecord, CullMode, DepthBias,
    DepthTest, FrontFace, MaybeDynamic, NativeHandle, PipelineDescriptor, RenderBackend, RenderContext,
    RenderStageDescriptor, SamplerDescriptor, SharedBackend, ShaderStage, StencilTest, Topology,
};
use crate::util::{FormatElement, NumericType};

// ============================================================================
// Recorded objects
// ============================================================================

#[derive(Debug, Clone)]
pub struct MockFormat {
    pub handle: NativeHandle,
    pub attachments: Vec<AttachmentDescriptor>,
    pub stages: Vec<RenderStageDescriptor>,
    pub members: Vec<u32>,
    pub dependencies: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct MockShader {
    pub handle: NativeHandle,
    pub stage: ShaderStage,
    pub code: Vec<u8>,
    pub bindings: Vec<BindingDescriptor>,
    pub uniform_members: Vec<NumericType>,
}

#[derive(Debug, Clone)]
pub struct MockPipeline {
    pub handle: NativeHandle,
    pub format: NativeHandle,
    pub stage: u32,
    pub vertex_shader: NativeHandle,
    pub fragment_shader: NativeHandle,
    pub vertex_format: Vec<FormatElement>,
    pub vertex_stride: u32,
    pub instance_format: Vec<FormatElement>,
    pub instance_stride: u32,
    pub blend: Vec<BlendOptions>,
    pub topology: Topology,
    pub line_width: MaybeDynamic<f32>,
    pub depth_bias: MaybeDynamic<DepthBias>,
    pub depth_test: MaybeDynamic<DepthTest>,
    pub stencil_test: MaybeDynamic<StencilTest>,
    pub cull_mode: MaybeDynamic<CullMode>,
    pub front_face: MaybeDynamic<FrontFace>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockCommit {
    pub command_buffer: NativeHandle,
    pub format: NativeHandle,
    pub records: Vec<CommandRecord>,
}

/// Everything the mock has seen
#[derive(Debug, Default)]
pub struct MockState {
    next_handle: u64,
    /// Error returned by the next fallible call, then cleared
    pub fail_next: Option<String>,
    pub formats: Vec<MockFormat>,
    pub shaders: Vec<MockShader>,
    pub pipelines: Vec<MockPipeline>,
    pub framebuffers: FxHashMap<NativeHandle, (u32, u32, Vec<NativeHandle>)>,
    pub textures: FxHashMap<NativeHandle, (u32, u32)>,
    pub vertex_buffers: FxHashMap<NativeHandle, (Vec<u8>, u32, bool)>,
    pub uniform_buffers: FxHashMap<NativeHandle, Vec<u8>>,
    pub uniform_bindings: FxHashMap<NativeHandle, NativeHandle>,
    pub samplers: FxHashMap<NativeHandle, SamplerDescriptor>,
    pub texture_bindings: FxHashMap<NativeHandle, (NativeHandle, NativeHandle)>,
    pub command_buffers: Vec<NativeHandle>,
    pub commits: Vec<MockCommit>,
    pub enqueued: Vec<(NativeHandle, NativeHandle)>,
    pub destroyed: Vec<NativeHandle>,
}

impl MockState {
    fn next(&mut self) -> Result<NativeHandle> {
        if let Some(message) = self.fail_next.take() {
            return Err(Error::BackendError(message));
        }
        self.next_handle += 1;
        Ok(NativeHandle::from_raw(self.next_handle))
    }

    fn check(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(message) => Err(Error::BackendError(message)),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// State shared with the test
    pub fn state(&self) -> Arc<Mutex<MockState>> {
        self.state.clone()
    }
}

/// A context on a fresh mock, plus the mock's state
pub fn mock_context() -> (RenderContext, Arc<Mutex<MockState>>) {
    let mock = MockBackend::new();
    let state = mock.state();
    let backend: SharedBackend = Arc::new(Mutex::new(mock));
    (RenderContext::new(backend), state)
}

impl RenderBackend for MockBackend {
    fn create_framebuffer_format(
        &mut self,
        attachments: &[AttachmentDescriptor],
        stages: &[RenderStageDescriptor],
        members: &[u32],
        dependencies: &[u32],
    ) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.formats.push(MockFormat {
            handle,
            attachments: attachments.to_vec(),
            stages: stages.to_vec(),
            members: members.to_vec(),
            dependencies: dependencies.to_vec(),
        });
        Ok(handle)
    }

    fn create_framebuffer(&mut self, format: NativeHandle, width: u32, height: u32) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let attachment_count = state
            .formats
            .iter()
            .find(|recorded| recorded.handle == format)
            .map(|recorded| recorded.attachments.len())
            .ok_or_else(|| Error::InvalidResource(format!("Unknown format {}", format)))?;

        let handle = state.next()?;
        let mut textures = Vec::with_capacity(attachment_count);
        for _ in 0..attachment_count {
            let texture = state.next()?;
            state.textures.insert(texture, (width, height));
            textures.push(texture);
        }
        state.framebuffers.insert(handle, (width, height, textures));
        Ok(handle)
    }

    fn framebuffer_size(&self, framebuffer: NativeHandle) -> Result<(u32, u32)> {
        let state = self.state.lock().unwrap();
        state
            .framebuffers
            .get(&framebuffer)
            .map(|(width, height, _)| (*width, *height))
            .ok_or_else(|| Error::InvalidResource(format!("Unknown framebuffer {}", framebuffer)))
    }

    fn framebuffer_texture(&self, framebuffer: NativeHandle, attachment: u32) -> Result<NativeHandle> {
        let state = self.state.lock().unwrap();
        state
            .framebuffers
            .get(&framebuffer)
            .and_then(|(_, _, textures)| textures.get(attachment as usize).copied())
            .ok_or_else(|| Error::InvalidResource(format!("No attachment {} on {}", attachment, framebuffer)))
    }

    fn create_shader(
        &mut self,
        stage: ShaderStage,
        code: &[u8],
        bindings: &[BindingDescriptor],
        uniform_members: &[NumericType],
    ) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.shaders.push(MockShader {
            handle,
            stage,
            code: code.to_vec(),
            bindings: bindings.to_vec(),
            uniform_members: uniform_members.to_vec(),
        });
        Ok(handle)
    }

    fn create_pipeline(&mut self, desc: &PipelineDescriptor<'_>) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.pipelines.push(MockPipeline {
            handle,
            format: desc.format,
            stage: desc.stage,
            vertex_shader: desc.vertex_shader,
            fragment_shader: desc.fragment_shader,
            vertex_format: desc.vertex_format.to_vec(),
            vertex_stride: desc.vertex_stride,
            instance_format: desc.instance_format.to_vec(),
            instance_stride: desc.instance_stride,
            blend: desc.blend.to_vec(),
            topology: desc.topology,
            line_width: desc.line_width,
            depth_bias: desc.depth_bias,
            depth_test: desc.depth_test,
            stencil_test: desc.stencil_test,
            cull_mode: desc.cull_mode,
            front_face: desc.front_face,
        });
        Ok(handle)
    }

    fn create_vertex_buffer(&mut self, data: &[u8], vertex_size: u32, writable: bool) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.vertex_buffers.insert(handle, (data.to_vec(), vertex_size, writable));
        Ok(handle)
    }

    fn write_vertex_buffer(&mut self, buffer: NativeHandle, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        match state.vertex_buffers.get_mut(&buffer) {
            Some((contents, _, true)) => {
                *contents = data.to_vec();
                Ok(())
            }
            Some(_) => Err(Error::InvalidResource(format!("Vertex buffer {} is not writable", buffer))),
            None => Err(Error::InvalidResource(format!("Unknown vertex buffer {}", buffer))),
        }
    }

    fn create_uniform_buffer(&mut self, _shader: NativeHandle, _binding: u32, data: &[u8]) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.uniform_buffers.insert(handle, data.to_vec());
        Ok(handle)
    }

    fn write_uniform_buffer(&mut self, buffer: NativeHandle, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.uniform_buffers.insert(buffer, data.to_vec());
        Ok(())
    }

    fn create_uniform_binding(&mut self, _shader: NativeHandle, _binding: u32, buffer: NativeHandle) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.uniform_bindings.insert(handle, buffer);
        Ok(handle)
    }

    fn update_uniform_binding(&mut self, binding: NativeHandle, buffer: NativeHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.uniform_bindings.insert(binding, buffer);
        Ok(())
    }

    fn create_texture(&mut self, width: u32, height: u32, _rgba: &[u8]) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.textures.insert(handle, (width, height));
        Ok(handle)
    }

    fn texture_size(&self, texture: NativeHandle) -> Result<(u32, u32)> {
        let state = self.state.lock().unwrap();
        state
            .textures
            .get(&texture)
            .copied()
            .ok_or_else(|| Error::InvalidResource(format!("Unknown texture {}", texture)))
    }

    fn create_texture_sampler(&mut self, desc: &SamplerDescriptor) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.samplers.insert(handle, *desc);
        Ok(handle)
    }

    fn create_texture_binding(
        &mut self,
        _shader: NativeHandle,
        _binding: u32,
        sampler: NativeHandle,
        texture: NativeHandle,
    ) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.texture_bindings.insert(handle, (sampler, texture));
        Ok(handle)
    }

    fn update_texture_binding(&mut self, binding: NativeHandle, sampler: NativeHandle, texture: NativeHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.texture_bindings.insert(binding, (sampler, texture));
        Ok(())
    }

    fn create_command_buffer(&mut self) -> Result<NativeHandle> {
        let mut state = self.state.lock().unwrap();
        let handle = state.next()?;
        state.command_buffers.push(handle);
        Ok(handle)
    }

    fn commit_command_buffer(
        &mut self,
        command_buffer: NativeHandle,
        format: NativeHandle,
        commands: &[CommandRecord],
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.commits.push(MockCommit {
            command_buffer,
            format,
            records: commands.to_vec(),
        });
        Ok(())
    }

    fn enqueue(&mut self, target: NativeHandle, command_buffer: NativeHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check()?;
        state.enqueued.push((target, command_buffer));
        Ok(())
    }

    fn destroy(&mut self, handle: NativeHandle) {
        self.state.lock().unwrap().destroyed.push(handle);
    }
}
