#![deny(missing_docs)]
//! Shared logging utilities for the queue workspace.
//!
//! This crate provides the `queue_*` logging macros used across the codebase,
//! the per-thread cycle tag that prefixes log lines emitted while a submission
//! cycle is in flight, and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Thread-local storage for the submission cycle currently in flight.
    static CYCLE: Cell<u64> = const { Cell::new(0) };
}

/// Sets the submission cycle number for the current thread.
/// Pass 0 once the cycle has ended.
pub fn set_cycle(cycle: u64) {
    CYCLE.with(|v| v.set(cycle));
}

/// Retrieves the submission cycle number for the current thread.
/// Returns 0 when no cycle is in flight.
pub fn current_cycle() -> u64 {
    CYCLE.with(|v| v.get())
}

/// Prefix prepended by the `queue_*` macros.
#[doc(hidden)]
pub fn line_prefix() -> String {
    match current_cycle() {
        0 => "[QUEUE] ".to_string(),
        n => format!("[QUEUE #{n}] "),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! queue_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("{}{}", $crate::line_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! queue_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("{}{}", $crate::line_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! queue_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("{}{}", $crate::line_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! queue_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("{}{}", $crate::line_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! queue_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("{}{}", $crate::line_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
