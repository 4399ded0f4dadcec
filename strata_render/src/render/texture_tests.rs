use super::*;
use crate::error::Error;
use crate::render::mock_backend::mock_context;

#[test]
fn test_sampler_defaults() {
    let descriptor = SamplerDescriptor::default();
    assert_eq!(descriptor.min_filter, TextureFiltering::Linear);
    assert_eq!(descriptor.mag_filter, TextureFiltering::Linear);
    assert_eq!(descriptor.wrapping, TextureWrapping::Repeat);
    assert_eq!(descriptor.border_color, TextureBorderColor::OpaqueBlack);
    assert!(!descriptor.anisotropy_enabled);
}

#[test]
fn test_sampler_builder_methods() {
    let descriptor = SamplerDescriptor::new(TextureFiltering::Nearest, TextureFiltering::Linear, TextureWrapping::ClampToBorder)
        .with_border_color(TextureBorderColor::OpaqueWhite)
        .with_anisotropy(8.0);

    assert_eq!(descriptor.min_filter, TextureFiltering::Nearest);
    assert_eq!(descriptor.wrapping, TextureWrapping::ClampToBorder);
    assert_eq!(descriptor.border_color, TextureBorderColor::OpaqueWhite);
    assert!(descriptor.anisotropy_enabled);
    assert_eq!(descriptor.max_anisotropy, 8.0);
}

#[test]
fn test_create_texture_checks_byte_count() {
    let (context, state) = mock_context();

    assert!(matches!(context.create_texture(2, 2, &[0; 15]), Err(Error::InvalidArgument(_))));
    assert!(matches!(context.create_texture(0, 2, &[]), Err(Error::InvalidArgument(_))));
    assert!(state.lock().unwrap().textures.is_empty());

    let texture = context.create_texture(2, 2, &[255; 16]).unwrap();
    assert_eq!(texture.size().unwrap(), (2, 2));
    assert!(!texture.is_attachment());
}

#[test]
fn test_sampler_reaches_backend() {
    let (context, state) = mock_context();
    let descriptor = SamplerDescriptor::default().with_anisotropy(4.0);

    let sampler = context.create_texture_sampler(descriptor).unwrap();
    assert_eq!(state.lock().unwrap().samplers[&sampler.handle()], descriptor);
    assert_eq!(sampler.descriptor(), &descriptor);
}

#[test]
fn test_texture_binding_update() {
    let (context, state) = mock_context();

    let mut shader = context.create_fragment_shader(b"fs");
    let slot = shader.with_sampler();
    let shader = shader.build().unwrap();

    let binding = context.create_texture_binding(&shader, slot, None, None).unwrap();
    assert_eq!(binding.binding(), 0);
    assert_eq!(
        state.lock().unwrap().texture_bindings[&binding.handle()],
        (NativeHandle::NULL, NativeHandle::NULL)
    );

    let sampler = context.create_texture_sampler(SamplerDescriptor::default()).unwrap();
    let texture = context.create_texture(1, 1, &[0, 0, 0, 255]).unwrap();
    binding.update(Some(&sampler), Some(&texture)).unwrap();
    assert_eq!(
        state.lock().unwrap().texture_bindings[&binding.handle()],
        (sampler.handle(), texture.handle())
    );
}

#[test]
fn test_owned_texture_destroyed_on_drop() {
    let (context, state) = mock_context();
    let texture = context.create_texture(1, 1, &[0; 4]).unwrap();
    let handle = texture.handle();

    drop(texture);
    assert_eq!(state.lock().unwrap().destroyed, vec![handle]);
}
