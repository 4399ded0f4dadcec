use super::*;
use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use crate::render::framebuffer_format::TextureFormat;
use crate::render::mock_backend::mock_context;
use crate::util::BufferPool;

#[repr(C)]
#[derive(Clone, Copy, Default, Pod, Zeroable)]
struct Light {
    color: glam::Vec4,
    intensity: f32,
    _pad: [f32; 3],
}

crate::format_layout!(Light { color: glam::Vec4, intensity: f32, _pad: [f32; 3] });

fn lights(count: usize) -> NativeBuffer<Light> {
    let mut buffer = NativeBuffer::new();
    for i in 0..count {
        buffer.add(Light { color: Vec4::ONE, intensity: i as f32, _pad: [0.0; 3] }).unwrap();
    }
    buffer
}

// ============================================================================
// Uniforms
// ============================================================================

#[test]
fn test_uniform_buffer_write() {
    let (context, state) = mock_context();

    let mut shader = context.create_vertex_shader(b"vs");
    let slot = shader.with_uniform::<Light>().unwrap();
    let shader = shader.build().unwrap();

    let mut buffer = context.create_uniform_buffer(&shader, slot, &lights(2)).unwrap();
    assert_eq!(buffer.binding(), 0);
    assert_eq!(buffer.count(), 2);
    assert_eq!(state.lock().unwrap().uniform_buffers[&buffer.handle()].len(), 64);

    buffer.write(&lights(4)).unwrap();
    assert_eq!(buffer.count(), 4);
    assert_eq!(state.lock().unwrap().uniform_buffers[&buffer.handle()].len(), 128);
}

#[test]
fn test_uniform_binding_starts_empty_and_updates() {
    let (context, state) = mock_context();

    let mut shader = context.create_fragment_shader(b"fs");
    let slot = shader.with_uniform::<Light>().unwrap();
    let shader = shader.build().unwrap();

    let binding = context.create_uniform_binding(&shader, slot, None).unwrap();
    assert_eq!(state.lock().unwrap().uniform_bindings[&binding.handle()], NativeHandle::NULL);

    let buffer = context.create_uniform_buffer(&shader, slot, &lights(1)).unwrap();
    binding.update(Some(&buffer)).unwrap();
    assert_eq!(state.lock().unwrap().uniform_bindings[&binding.handle()], buffer.handle());
}

#[test]
fn test_uniform_buffer_of_another_slot_is_rejected() {
    let (context, _state) = mock_context();

    let mut shader = context.create_vertex_shader(b"vs");
    let first = shader.with_uniform::<Light>().unwrap();
    let second = shader.with_uniform::<Light>().unwrap();
    let shader = shader.build().unwrap();

    let buffer = context.create_uniform_buffer(&shader, first, &lights(1)).unwrap();
    assert!(matches!(
        context.create_uniform_binding(&shader, second, Some(&buffer)),
        Err(Error::InvalidArgument(_))
    ));
}

// ============================================================================
// Submission
// ============================================================================

#[test]
fn test_enqueue_after_commit() {
    let (context, state) = mock_context();

    let mut builder = context.create_framebuffer_format();
    let color = builder.with_color_attachment(TextureFormat::R8G8B8A8Srgb, Vec4::ZERO);
    builder.with_stage(&[color], None).unwrap();
    let format = builder.build().unwrap();
    let framebuffer = context.create_framebuffer(&format, 32, 32).unwrap();
    let command_buffer = context.create_command_buffer().unwrap();
    let pool = BufferPool::new();

    let mut recorder = command_buffer.begin_recording(&format, &pool).unwrap();
    recorder.set_viewport_and_scissor_to(&framebuffer).unwrap();
    assert!(matches!(context.enqueue(&framebuffer, &command_buffer), Err(Error::InvalidArgument(_))));

    recorder.commit(&context).unwrap();
    context.enqueue(&framebuffer, &command_buffer).unwrap();
    assert_eq!(
        state.lock().unwrap().enqueued,
        vec![(framebuffer.handle(), command_buffer.handle())]
    );
}

#[test]
fn test_clones_share_backend() {
    let (context, state) = mock_context();
    let clone = context.clone();

    let first = context.create_command_buffer().unwrap();
    let second = clone.create_command_buffer().unwrap();

    assert_ne!(first.handle(), second.handle());
    assert_eq!(state.lock().unwrap().command_buffers.len(), 2);
}

#[test]
fn test_backend_errors_surface_unchanged() {
    let (context, state) = mock_context();
    state.lock().unwrap().fail_next = Some("no more handles".to_string());

    match context.create_command_buffer() {
        Err(Error::BackendError(message)) => assert_eq!(message, "no more handles"),
        other => panic!("expected BackendError, got {:?}", other.map(|_| ())),
    }
    assert!(context.create_command_buffer().is_ok());
}
