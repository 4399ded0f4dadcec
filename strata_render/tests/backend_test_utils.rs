#![allow(dead_code)]
//! Backend test utilities - headless contexts shared by integration tests
//!
//! Each test opens its own headless backend with validation enabled, so the
//! backend checks every flat array and command stream the host produces.
//! The typed backend handle is returned next to the context for inspection.

use std::sync::{Arc, Mutex};
use strata_render::bytemuck::{Pod, Zeroable};
use strata_render::glam::{Mat4, Vec4};
use strata_render::strata::PlatformConfig;
use strata_render::strata::render::{
    FragmentShader, FramebufferFormat, RenderContext, SamplerSlot, TextureFormat, UniformSlot,
    VertexShader,
};
use strata_render::strata::util::NativeBuffer;
use strata_render_headless::HeadlessBackend;

// ============================================================================
// Shapes
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

strata_render::format_layout!(Vertex { position: [f32; 3], uv: [f32; 2] });

#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub offset: [f32; 4],
}

strata_render::format_layout!(Instance { offset: [f32; 4] });

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
pub struct Camera {
    pub view_projection: Mat4,
    pub eye: Vec4,
}

strata_render::format_layout!(Camera { view_projection: Mat4, eye: Vec4 });

// ============================================================================
// Contexts and common objects
// ============================================================================

/// Headless context with validation on, plus the backend behind it
pub fn headless_context() -> (RenderContext, Arc<Mutex<HeadlessBackend>>) {
    let config = PlatformConfig {
        enable_validation: true,
        app_name: "strata integration tests".to_string(),
        ..PlatformConfig::default()
    };
    let backend = HeadlessBackend::shared(&config);
    (RenderContext::new(HeadlessBackend::as_shared(&backend)), backend)
}

/// One color attachment, one stage
pub fn single_stage_format(context: &RenderContext) -> Arc<FramebufferFormat> {
    let mut builder = context.create_framebuffer_format();
    let color = builder.with_color_attachment(TextureFormat::B8G8R8A8Srgb, Vec4::new(0.0, 0.0, 0.0, 1.0));
    builder.with_stage(&[color], None).unwrap();
    builder.build().unwrap()
}

/// Vertex shader with a camera block, fragment shader with one sampler
pub fn shaders(context: &RenderContext) -> (VertexShader, FragmentShader, UniformSlot<Camera>, SamplerSlot) {
    let mut vertex = context.create_vertex_shader(&[0x03, 0x02, 0x23, 0x07]);
    let camera = vertex.with_uniform::<Camera>().unwrap();
    let mut fragment = context.create_fragment_shader(&[0x03, 0x02, 0x23, 0x07]);
    let albedo = fragment.with_sampler();
    (vertex.build().unwrap(), fragment.build().unwrap(), camera, albedo)
}

pub fn quad() -> NativeBuffer<Vertex> {
    let mut buffer = NativeBuffer::new();
    for (position, uv) in [
        ([-1.0, -1.0, 0.0], [0.0, 0.0]),
        ([1.0, -1.0, 0.0], [1.0, 0.0]),
        ([1.0, 1.0, 0.0], [1.0, 1.0]),
        ([-1.0, 1.0, 0.0], [0.0, 1.0]),
    ] {
        buffer.add(Vertex { position, uv }).unwrap();
    }
    buffer
}

pub fn cameras(count: usize) -> NativeBuffer<Camera> {
    let mut buffer = NativeBuffer::new();
    for i in 0..count {
        buffer
            .add(Camera { view_projection: Mat4::IDENTITY, eye: Vec4::new(i as f32, 0.0, 0.0, 1.0) })
            .unwrap();
    }
    buffer
}
