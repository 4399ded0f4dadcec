use super::*;
use bytemuck::{Pod, Zeroable};
use crate::render::mock_backend::mock_context;

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
struct Camera {
    view_projection: glam::Mat4,
    position: glam::Vec4,
}

crate::format_layout!(Camera { view_projection: glam::Mat4, position: glam::Vec4 });

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
struct Fog {
    density: f32,
    start: f32,
}

crate::format_layout!(Fog { density: f32, start: f32 });

#[test]
fn test_bindings_are_indexed_in_declaration_order() {
    let (context, state) = mock_context();

    let mut builder = context.create_fragment_shader(&[1, 2, 3, 4]);
    let camera = builder.with_uniform::<Camera>().unwrap();
    let sampler = builder.with_sampler();
    let fog = builder.with_uniform::<Fog>().unwrap();
    let shader = builder.build().unwrap();

    assert_eq!(camera.binding(), 0);
    assert_eq!(sampler.binding(), 1);
    assert_eq!(fog.binding(), 2);
    assert_eq!(shader.stage(), ShaderStage::Fragment);

    let state = state.lock().unwrap();
    let recorded = &state.shaders[0];
    assert_eq!(recorded.handle, shader.handle());
    assert_eq!(recorded.code, vec![1, 2, 3, 4]);
    assert_eq!(
        recorded.bindings,
        vec![
            BindingDescriptor::Uniform { member_offset: 0, member_count: 2, size: 80 },
            BindingDescriptor::Sampler,
            BindingDescriptor::Uniform { member_offset: 2, member_count: 2, size: 8 },
        ]
    );
    assert_eq!(
        recorded.uniform_members,
        vec![NumericType::Float4x4, NumericType::Float4, NumericType::Float, NumericType::Float]
    );
}

#[test]
fn test_shader_without_bindings() {
    let (context, state) = mock_context();

    let shader = context.create_vertex_shader(b"main").build().unwrap();
    assert_eq!(shader.stage(), ShaderStage::Vertex);
    assert!(shader.bindings().is_empty());
    assert!(state.lock().unwrap().shaders[0].uniform_members.is_empty());
}

#[test]
fn test_slot_from_another_shader_is_rejected() {
    let (context, _state) = mock_context();

    let mut first = context.create_vertex_shader(b"a");
    let camera = first.with_uniform::<Camera>().unwrap();
    let first = first.build().unwrap();

    let mut second = context.create_vertex_shader(b"b");
    second.with_uniform::<Camera>().unwrap();
    let second = second.build().unwrap();

    assert_eq!(first.uniform_binding(camera).unwrap(), 0);
    assert!(matches!(second.uniform_binding(camera), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_dropping_shader_destroys_handle() {
    let (context, state) = mock_context();

    let shader = context.create_vertex_shader(b"main").build().unwrap();
    let handle = shader.handle();
    drop(shader);

    assert_eq!(state.lock().unwrap().destroyed, vec![handle]);
}
