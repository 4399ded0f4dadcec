/// Strata Platform - process-wide entry point
///
/// Owns the global logger slot and opens render contexts through the backend
/// plugin registry. Everything else hangs off the returned [`RenderContext`].

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::render::{self, RenderContext};
use crate::error::Result;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== CONFIGURATION =====

/// Platform configuration handed to the backend factory
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Enable backend-side validation of descriptors and command streams
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Strata Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

// ===== PUBLIC API =====

/// Platform facade
///
/// # Example
///
/// ```no_run
/// use strata_render::strata::{Platform, PlatformConfig};
///
/// strata_render_headless::register();
/// let context = Platform::create_context("headless", PlatformConfig::default())?;
/// let format = context.create_framebuffer_format();
/// # Ok::<(), strata_render::strata::Error>(())
/// ```
pub struct Platform;

impl Platform {
    /// Open a render context on the named backend plugin
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if no plugin is registered under
    /// `backend_name`, or whatever error the plugin factory returns.
    pub fn create_context(backend_name: &str, config: PlatformConfig) -> Result<RenderContext> {
        let app_name = config.app_name.clone();
        let backend = render::create_backend(backend_name, config).map_err(|error| {
            crate::strata_error!("strata::Platform", "Failed to create backend '{}': {}", backend_name, error);
            error
        })?;

        crate::strata_info!(
            "strata::Platform",
            "Render context opened on backend '{}' for '{}'",
            backend_name, app_name
        );

        Ok(RenderContext::new(backend))
    }

    /// Names of the registered backend plugins, sorted
    pub fn available_backends() -> Vec<&'static str> {
        render::registered_backends()
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// capture logger in tests, ...)
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_slot().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like strata_info!, strata_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_slot().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_slot().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
