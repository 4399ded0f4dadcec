/// Shader modules and their binding slots.
///
/// Byte code is opaque to this crate. A [`ShaderBuilder`] declares the
/// shader's binding slots in order (uniform blocks and samplers); slot `i`
/// is the `i`-th declaration. The returned slot tokens are later used to
/// create uniform buffers, uniform bindings and texture bindings against the
/// built shader.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use crate::error::{Error, Result};
use crate::render::backend::{with_backend, SharedBackend};
use crate::render::handle::{NativeHandle, OwnedHandle};
use crate::util::{FormatDescriptor, FormatLayout, NumericType};

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

/// Programmable stage a shader runs in
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Type-level shader stage
pub trait ShaderKind: Send + Sync + 'static {
    const STAGE: ShaderStage;
}

/// Marker for vertex shaders
#[derive(Debug, Clone, Copy)]
pub enum VertexStage {}

/// Marker for fragment shaders
#[derive(Debug, Clone, Copy)]
pub enum FragmentStage {}

impl ShaderKind for VertexStage {
    const STAGE: ShaderStage = ShaderStage::Vertex;
}

impl ShaderKind for FragmentStage {
    const STAGE: ShaderStage = ShaderStage::Fragment;
}

/// One binding slot, as handed to the backend
#[repr(C, u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingDescriptor {
    /// Uniform block; members live in the shader's shared member list
    Uniform {
        member_offset: u32,
        member_count: u32,
        /// Size of the block in bytes
        size: u32,
    },
    /// Combined texture sampler
    Sampler,
}

// ============================================================================
// Slots
// ============================================================================

/// Uniform block slot of shape `U`
pub struct UniformSlot<U> {
    builder: u64,
    binding: u32,
    _shape: PhantomData<fn() -> U>,
}

impl<U> UniformSlot<U> {
    pub fn binding(&self) -> u32 {
        self.binding
    }
}

impl<U> Clone for UniformSlot<U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for UniformSlot<U> {}

impl<U> fmt::Debug for UniformSlot<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformSlot").field("binding", &self.binding).finish()
    }
}

/// Sampler slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSlot {
    builder: u64,
    binding: u32,
}

impl SamplerSlot {
    pub fn binding(&self) -> u32 {
        self.binding
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Declares the binding slots of a shader before creating it
pub struct ShaderBuilder<K: ShaderKind> {
    backend: SharedBackend,
    id: u64,
    code: Vec<u8>,
    bindings: Vec<BindingDescriptor>,
    uniform_members: Vec<NumericType>,
    _kind: PhantomData<K>,
}

impl<K: ShaderKind> ShaderBuilder<K> {
    pub(crate) fn new(backend: SharedBackend, code: &[u8]) -> Self {
        Self {
            backend,
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            code: code.to_vec(),
            bindings: Vec::new(),
            uniform_members: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Declare the next slot as a uniform block of shape `U`
    ///
    /// # Errors
    ///
    /// Fails if `U` has no valid format descriptor.
    pub fn with_uniform<U: FormatLayout>(&mut self) -> Result<UniformSlot<U>> {
        let descriptor = FormatDescriptor::of::<U>()?;

        let binding = self.bindings.len() as u32;
        self.bindings.push(BindingDescriptor::Uniform {
            member_offset: self.uniform_members.len() as u32,
            member_count: descriptor.elements().len() as u32,
            size: descriptor.stride(),
        });
        self.uniform_members
            .extend(descriptor.elements().iter().map(|element| element.numeric_type));

        Ok(UniformSlot { builder: self.id, binding, _shape: PhantomData })
    }

    /// Declare the next slot as a texture sampler
    pub fn with_sampler(&mut self) -> SamplerSlot {
        let binding = self.bindings.len() as u32;
        self.bindings.push(BindingDescriptor::Sampler);
        SamplerSlot { builder: self.id, binding }
    }

    /// Create the shader module
    pub fn build(self) -> Result<Shader<K>> {
        let raw = with_backend(&self.backend, "strata::ShaderBuilder", |backend| {
            backend.create_shader(K::STAGE, &self.code, &self.bindings, &self.uniform_members)
        })?;

        crate::strata_debug!(
            "strata::ShaderBuilder",
            "Created {:?} shader {} ({} bytes, {} bindings)",
            K::STAGE, raw, self.code.len(), self.bindings.len()
        );

        Ok(Shader {
            handle: OwnedHandle::new(raw, self.backend),
            builder: self.id,
            bindings: self.bindings,
            _kind: PhantomData,
        })
    }
}

// ============================================================================
// Shader
// ============================================================================

/// Shader module of stage `K`
pub struct Shader<K: ShaderKind> {
    handle: OwnedHandle,
    builder: u64,
    bindings: Vec<BindingDescriptor>,
    _kind: PhantomData<K>,
}

pub type VertexShader = Shader<VertexStage>;
pub type FragmentShader = Shader<FragmentStage>;

impl<K: ShaderKind> Shader<K> {
    pub fn handle(&self) -> NativeHandle {
        self.handle.raw()
    }

    pub fn stage(&self) -> ShaderStage {
        K::STAGE
    }

    pub fn bindings(&self) -> &[BindingDescriptor] {
        &self.bindings
    }

    /// Binding index of a uniform slot declared on this shader
    pub fn uniform_binding<U>(&self, slot: UniformSlot<U>) -> Result<u32> {
        self.check_slot(slot.builder)?;
        Ok(slot.binding)
    }

    /// Binding index of a sampler slot declared on this shader
    pub fn sampler_binding(&self, slot: SamplerSlot) -> Result<u32> {
        self.check_slot(slot.builder)?;
        Ok(slot.binding)
    }

    fn check_slot(&self, builder: u64) -> Result<()> {
        if builder != self.builder {
            return Err(crate::strata_fail!(
                "strata::Shader",
                Error::InvalidArgument(format!("Binding slot does not belong to shader {}", self.handle()))
            ));
        }
        Ok(())
    }
}

impl<K: ShaderKind> fmt::Debug for Shader<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("stage", &K::STAGE)
            .field("handle", &self.handle.raw())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
