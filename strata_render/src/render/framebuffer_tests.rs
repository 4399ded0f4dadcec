use super::*;
use glam::Vec4;
use crate::render::framebuffer_format::TextureFormat;
use crate::render::mock_backend::mock_context;

fn two_attachment_format(context: &crate::render::RenderContext) -> Arc<FramebufferFormat> {
    let mut builder = context.create_framebuffer_format();
    let color = builder.with_color_attachment(TextureFormat::R8G8B8A8Srgb, Vec4::ZERO);
    let depth = builder.with_depth_stencil_attachment();
    builder.with_stage(&[color], Some(depth)).unwrap();
    builder.build().unwrap()
}

#[test]
fn test_one_texture_per_attachment() {
    let (context, state) = mock_context();
    let format = two_attachment_format(&context);

    let framebuffer = context.create_framebuffer(&format, 1280, 720).unwrap();
    assert_eq!(framebuffer.textures().len(), 2);
    assert!(framebuffer.textures().iter().all(Texture::is_attachment));

    let recorded = state.lock().unwrap().framebuffers[&framebuffer.handle()].clone();
    assert_eq!(framebuffer.textures()[1].handle(), recorded.2[1]);
}

#[test]
fn test_size_comes_from_backend() {
    let (context, _state) = mock_context();
    let format = two_attachment_format(&context);

    let framebuffer = context.create_framebuffer(&format, 1280, 720).unwrap();
    assert_eq!(framebuffer.size().unwrap(), (1280, 720));
    assert_eq!(framebuffer.width().unwrap(), 1280);
    assert_eq!(framebuffer.height().unwrap(), 720);
    assert_eq!(framebuffer.target_size().unwrap(), (1280, 720));
    assert_eq!(framebuffer.textures()[0].size().unwrap(), (1280, 720));
}

#[test]
fn test_texture_lookup_by_attachment() {
    let (context, _state) = mock_context();
    let format = two_attachment_format(&context);
    let framebuffer = context.create_framebuffer(&format, 64, 64).unwrap();

    let depth = &format.attachments()[1];
    assert_eq!(
        framebuffer.texture(depth).unwrap().handle(),
        framebuffer.textures()[1].handle()
    );

    let other = two_attachment_format(&context);
    assert!(matches!(
        framebuffer.texture(&other.attachments()[1]),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_zero_size_is_rejected() {
    let (context, state) = mock_context();
    let format = two_attachment_format(&context);

    assert!(matches!(context.create_framebuffer(&format, 0, 600), Err(Error::InvalidArgument(_))));
    assert!(state.lock().unwrap().framebuffers.is_empty());
}

#[test]
fn test_drop_destroys_framebuffer_only() {
    let (context, state) = mock_context();
    let format = two_attachment_format(&context);
    let framebuffer = context.create_framebuffer(&format, 8, 8).unwrap();
    let handle = framebuffer.handle();

    drop(framebuffer);
    assert_eq!(state.lock().unwrap().destroyed, vec![handle]);
}
