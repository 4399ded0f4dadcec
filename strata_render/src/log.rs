//! Internal logging system for Strata
//!
//! - Pluggable sink via the [`Logger`] trait (installed with `Platform::set_logger`)
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default, warnings and errors on stderr
//! - File and line information on ERROR entries

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use strata_render::strata::log::{Logger, LogEntry};
///
/// struct FrameLogger {
///     lines: std::sync::Mutex<Vec<String>>,
/// }
///
/// impl Logger for FrameLogger {
///     fn log(&self, entry: &LogEntry) {
///         self.lines.lock().unwrap().push(entry.message.clone());
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Handle one entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry passed to the installed [`Logger`]
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Time the entry was created
    pub timestamp: SystemTime,

    /// Emitting component (e.g. "strata::CommandBufferRecorder")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (ERROR entries only)
    pub file: Option<&'static str>,

    /// Source line (ERROR entries only)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-call detail (pool checkouts, record counts)
    Trace,

    /// Object compilation and lifecycle
    Debug,

    /// Notable events
    Info,

    /// Recoverable misuse (abandoned recordings)
    Warn,

    /// Returned errors, with file:line
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the default logger
    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Default logger: colored console output
///
/// Entries below `min_severity` are dropped. Warn and Error go to stderr.
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    pub min_severity: LogSeverity,
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self {
            min_severity: if cfg!(debug_assertions) {
                LogSeverity::Debug
            } else {
                LogSeverity::Info
            },
        }
    }
}

impl DefaultLogger {
    /// Render an entry without colors (used for tests and file sinks)
    pub fn format_plain(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");
        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, entry.severity.label(), entry.source, entry.message, file, line
            ),
            _ => format!(
                "[{}] [{}] [{}] {}",
                timestamp, entry.severity.label(), entry.source, entry.message
            ),
        }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity < self.min_severity {
            return;
        }

        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity = match entry.severity {
            LogSeverity::Trace => entry.severity.label().bright_black(),
            LogSeverity::Debug => entry.severity.label().cyan(),
            LogSeverity::Info => entry.severity.label().green(),
            LogSeverity::Warn => entry.severity.label().yellow(),
            LogSeverity::Error => entry.severity.label().red().bold(),
        };
        let source = entry.source.bright_blue();

        let line = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity, source, entry.message, file, line
            ),
            _ => format!("[{}] [{}] [{}] {}", timestamp, severity, source, entry.message),
        };

        if entry.severity >= LogSeverity::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! strata_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::strata::Platform::log(
            $crate::strata::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! strata_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::strata::Platform::log(
            $crate::strata::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! strata_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::strata::Platform::log(
            $crate::strata::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! strata_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::strata::Platform::log(
            $crate::strata::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! strata_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::strata::Platform::log_detailed(
            $crate::strata::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR and evaluate to `Error::BackendError` carrying the message
///
/// ```ignore
/// backend.lock().map_err(|_| strata_err!("strata::RenderContext", "Backend lock poisoned"))?;
/// ```
#[macro_export]
macro_rules! strata_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::strata::Platform::log_detailed(
            $crate::strata::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::strata::Error::BackendError(message)
    }};
}

/// Log an ERROR and return `Err(Error::BackendError(..))` from the enclosing function
#[macro_export]
macro_rules! strata_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::strata_err!($source, $($arg)*))
    };
}

/// Log an already-built [`Error`](crate::strata::Error) at ERROR level and evaluate to it
///
/// ```ignore
/// return Err(strata_fail!("strata::CommandBufferRecorder", Error::RecordingAlreadyCommitted));
/// ```
#[macro_export]
macro_rules! strata_fail {
    ($source:expr, $error:expr) => {{
        let error: $crate::strata::Error = $error;
        $crate::strata::Platform::log_detailed(
            $crate::strata::log::LogSeverity::Error,
            $source,
            error.to_string(),
            file!(),
            line!()
        );
        error
    }};
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
