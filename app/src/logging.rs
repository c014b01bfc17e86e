//! FILENAME: app/src/logging.rs
// PURPOSE: Unified logging system for the dashboard.
// CONTEXT: Every line carries a process-wide sequence number and a category
// so interleaved async work can be put back in order. Lines are handed to the
// `log` facade with the category as target; the host installs the sink.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

pub use log::Level;

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Minimum level, read once from `DASHBOARD_LOG` ("D", "I", "W" or "E").
static THRESHOLD: Lazy<Level> = Lazy::new(|| {
    std::env::var("DASHBOARD_LOG")
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(Level::Debug)
});

pub fn next_seq() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::SeqCst) + 1
}

fn parse_level(text: &str) -> Option<Level> {
    match text.trim().to_ascii_uppercase().as_str() {
        "D" | "DEBUG" => Some(Level::Debug),
        "I" | "INFO" => Some(Level::Info),
        "W" | "WARN" => Some(Level::Warn),
        "E" | "ERROR" => Some(Level::Error),
        _ => None,
    }
}

fn level_code(level: Level) -> char {
    match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => 'I',
        Level::Debug | Level::Trace => 'D',
    }
}

/// `seq|level|category|message`
pub fn format_line(seq: u64, level: Level, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level_code(level), category, message)
}

pub fn write_log(level: Level, category: &str, message: &str) {
    if level > *THRESHOLD {
        return;
    }
    let line = format_line(next_seq(), level, category, message);
    log::log!(target: category, level, "{}", line);
}

/// Function boundary line, `ENTER name detail` or `EXIT name detail`.
pub fn write_trace(category: &str, marker: &str, func_name: &str, detail: &str) {
    let message = match detail {
        "" => format!("{} {}", marker, func_name),
        _ => format!("{} {} {}", marker, func_name, detail),
    };
    write_log(Level::Debug, category, &message);
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log($crate::logging::Level::Debug, $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log($crate::logging::Level::Info, $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log($crate::logging::Level::Warn, $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log($crate::logging::Level::Error, $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_trace($cat, "ENTER", $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_trace($cat, "ENTER", $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_trace($cat, "EXIT", $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_trace($cat, "EXIT", $func, &format!($($arg)*))
    };
}

pub use log_debug;
pub use log_enter;
pub use log_error;
pub use log_exit;
pub use log_info;
pub use log_warn;
