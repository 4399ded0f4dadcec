//! Integration tests for headless backend registration
//!
//! Opens contexts through the plugin registry, the way an application does.
//!
//! Run with: cargo test --test plugin_integration_tests

use strata_render::strata::{Error, Platform, PlatformConfig};
use strata_render::strata::render::TextureFormat;
use strata_render::glam::Vec4;

#[test]
fn test_register_exposes_headless() {
    strata_render_headless::register();

    assert!(Platform::available_backends().contains(&strata_render_headless::BACKEND_NAME));
}

#[test]
fn test_context_from_registry_compiles_formats() {
    strata_render_headless::register();
    let context = Platform::create_context("headless", PlatformConfig::default()).unwrap();

    let mut builder = context.create_framebuffer_format();
    let color = builder.with_color_attachment(TextureFormat::R8G8B8A8Srgb, Vec4::ZERO);
    let depth = builder.with_depth_stencil_attachment();
    builder.with_stage(&[color], Some(depth)).unwrap();
    let format = builder.build().unwrap();

    let framebuffer = context.create_framebuffer(&format, 320, 240).unwrap();
    assert_eq!(framebuffer.size().unwrap(), (320, 240));
    assert_eq!(framebuffer.textures().len(), 2);
}

#[test]
fn test_unknown_backend_name() {
    strata_render_headless::register();

    assert!(matches!(
        Platform::create_context("no-such-backend", PlatformConfig::default()),
        Err(Error::InitializationFailed(_))
    ));
}
