/*!
# Strata Render - Headless Backend

CPU-side reference implementation of the Strata rendering backend.

This crate implements the `strata_render` backend trait without a GPU: it
hands out opaque handles from a slot map, keeps every committed command
stream and every enqueue for inspection, and (when validation is enabled)
checks the flat render-pass arrays, layouts, blend arrays and command
streams it receives.

The backend is registered as a plugin and can be selected at runtime.
*/

mod headless;
mod validation;

pub use headless::{FormatArrays, HeadlessBackend, Submission};
pub use validation::{validate_bindings, validate_blend, validate_graph, validate_layout, ValidationStats};

use strata_render::strata::render::{register_backend_plugin, SharedBackend};

/// Plugin name of the headless backend
pub const BACKEND_NAME: &str = "headless";

/// Register the headless backend with the plugin system
///
/// # Example
///
/// ```no_run
/// use strata_render::strata::{Platform, PlatformConfig};
///
/// strata_render_headless::register();
/// let context = Platform::create_context("headless", PlatformConfig::default())?;
/// # Ok::<(), strata_render::strata::Error>(())
/// ```
pub fn register() {
    register_backend_plugin(BACKEND_NAME, |config| {
        let backend: SharedBackend = HeadlessBackend::shared(&config);
        Ok(backend)
    });
}
