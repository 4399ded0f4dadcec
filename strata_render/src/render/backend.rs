/// RenderBackend trait - the native call surface
///
/// Everything the host side produces (flat render-pass graph arrays, format
/// descriptors, blend arrays, packed command streams) crosses into the native
/// backend through this trait. Backends register a factory in the plugin
/// registry and are opened by name through `Platform::create_context`.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::platform::PlatformConfig;
use crate::render::{
    AttachmentDescriptor, RenderStageDescriptor, BindingDescriptor, ShaderStage,
    PipelineDescriptor, SamplerDescriptor, CommandRecord, NativeHandle,
};
use crate::util::NumericType;

/// Backend shared by a context and every object it created
pub type SharedBackend = Arc<Mutex<dyn RenderBackend>>;

// ============================================================================
// RenderBackend trait
// ============================================================================

/// Native rendering backend
///
/// Implemented by backend crates (e.g. the headless reference backend).
/// Handles returned by `create_*` are never [`NativeHandle::NULL`].
pub trait RenderBackend: Send + Sync {
    /// Compile a render-pass graph from its four flat arrays
    ///
    /// `stages[i]` references `members[member_start..member_start + member_count]`
    /// and `dependencies[dependency_start..dependency_start + dependency_count]`.
    fn create_framebuffer_format(
        &mut self,
        attachments: &[AttachmentDescriptor],
        stages: &[RenderStageDescriptor],
        members: &[u32],
        dependencies: &[u32],
    ) -> Result<NativeHandle>;

    /// Instantiate a compiled format at the given size
    fn create_framebuffer(&mut self, format: NativeHandle, width: u32, height: u32) -> Result<NativeHandle>;

    /// Current (width, height) of a framebuffer
    fn framebuffer_size(&self, framebuffer: NativeHandle) -> Result<(u32, u32)>;

    /// Texture backing one attachment of a framebuffer (owned by the framebuffer)
    fn framebuffer_texture(&self, framebuffer: NativeHandle, attachment: u32) -> Result<NativeHandle>;

    /// Create a shader module from opaque byte code
    ///
    /// `bindings[i]` describes binding slot `i`; uniform bindings reference
    /// `uniform_members[member_offset..member_offset + member_count]`.
    fn create_shader(
        &mut self,
        stage: ShaderStage,
        code: &[u8],
        bindings: &[BindingDescriptor],
        uniform_members: &[NumericType],
    ) -> Result<NativeHandle>;

    /// Compile a pipeline bound to one stage of a format
    fn create_pipeline(&mut self, desc: &PipelineDescriptor<'_>) -> Result<NativeHandle>;

    /// Create a vertex (or instance) buffer from raw bytes
    fn create_vertex_buffer(&mut self, data: &[u8], vertex_size: u32, writable: bool) -> Result<NativeHandle>;

    /// Replace the contents of a writable vertex buffer
    fn write_vertex_buffer(&mut self, buffer: NativeHandle, data: &[u8]) -> Result<()>;

    /// Create a uniform buffer for binding slot `binding` of `shader`
    fn create_uniform_buffer(&mut self, shader: NativeHandle, binding: u32, data: &[u8]) -> Result<NativeHandle>;

    /// Replace the contents of a uniform buffer
    fn write_uniform_buffer(&mut self, buffer: NativeHandle, data: &[u8]) -> Result<()>;

    /// Bind a uniform buffer (or nothing yet, `NULL`) to a shader slot
    fn create_uniform_binding(&mut self, shader: NativeHandle, binding: u32, buffer: NativeHandle) -> Result<NativeHandle>;

    /// Point an existing uniform binding at another buffer
    fn update_uniform_binding(&mut self, binding: NativeHandle, buffer: NativeHandle) -> Result<()>;

    /// Create an RGBA8 texture (`rgba.len() == width * height * 4`)
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<NativeHandle>;

    /// (width, height) of a texture
    fn texture_size(&self, texture: NativeHandle) -> Result<(u32, u32)>;

    fn create_texture_sampler(&mut self, desc: &SamplerDescriptor) -> Result<NativeHandle>;

    /// Join a shader sampler slot with a sampler and a texture (either may be `NULL`)
    fn create_texture_binding(
        &mut self,
        shader: NativeHandle,
        binding: u32,
        sampler: NativeHandle,
        texture: NativeHandle,
    ) -> Result<NativeHandle>;

    fn update_texture_binding(&mut self, binding: NativeHandle, sampler: NativeHandle, texture: NativeHandle) -> Result<()>;

    fn create_command_buffer(&mut self) -> Result<NativeHandle>;

    /// Replace the recorded contents of a command buffer
    ///
    /// `commands` is the packed record stream, in recording order.
    fn commit_command_buffer(
        &mut self,
        command_buffer: NativeHandle,
        format: NativeHandle,
        commands: &[CommandRecord],
    ) -> Result<()>;

    /// Schedule a committed command buffer against a render target
    fn enqueue(&mut self, target: NativeHandle, command_buffer: NativeHandle) -> Result<()>;

    /// Release a backend object (called exactly once per owned handle)
    fn destroy(&mut self, handle: NativeHandle);
}

/// Lock the backend and run `f`, logging any error under `source`
pub(crate) fn with_backend<R>(
    backend: &SharedBackend,
    source: &str,
    f: impl FnOnce(&mut dyn RenderBackend) -> Result<R>,
) -> Result<R> {
    let mut guard: MutexGuard<'_, dyn RenderBackend> = backend
        .lock()
        .map_err(|_| crate::strata_err!(source, "Backend lock poisoned"))?;
    f(&mut *guard).map_err(|error| crate::strata_fail!(source, error))
}

// ============================================================================
// Plugin system for registering backends
// ============================================================================

/// Backend plugin factory function type
type BackendPluginFactory = Arc<dyn Fn(PlatformConfig) -> Result<SharedBackend> + Send + Sync>;

/// Plugin registry for render backends
#[derive(Default)]
pub struct BackendPluginRegistry {
    plugins: FxHashMap<&'static str, BackendPluginFactory>,
}

impl BackendPluginRegistry {
    /// Register (or replace) a plugin
    pub fn register_plugin<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(PlatformConfig) -> Result<SharedBackend> + Send + Sync + 'static,
    {
        self.plugins.insert(name, Arc::new(factory));
    }

    fn factory(&self, name: &str) -> Option<BackendPluginFactory> {
        self.plugins.get(name).cloned()
    }

    fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.plugins.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

static BACKEND_REGISTRY: OnceLock<Mutex<BackendPluginRegistry>> = OnceLock::new();

/// Get the global backend plugin registry
pub fn backend_plugin_registry() -> &'static Mutex<BackendPluginRegistry> {
    BACKEND_REGISTRY.get_or_init(|| Mutex::new(BackendPluginRegistry::default()))
}

/// Register a backend plugin in the global registry
///
/// # Arguments
///
/// * `name` - Plugin name (e.g. "headless")
/// * `factory` - Factory function
pub fn register_backend_plugin<F>(name: &'static str, factory: F)
where
    F: Fn(PlatformConfig) -> Result<SharedBackend> + Send + Sync + 'static,
{
    backend_plugin_registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register_plugin(name, factory);
}

/// Create a backend using a registered plugin
pub fn create_backend(name: &str, config: PlatformConfig) -> Result<SharedBackend> {
    let factory = backend_plugin_registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .factory(name)
        .ok_or_else(|| Error::InitializationFailed(format!("Backend plugin '{}' not found", name)))?;
    factory(config)
}

/// Names of the registered plugins, sorted
pub fn registered_backends() -> Vec<&'static str> {
    backend_plugin_registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .names()
}
