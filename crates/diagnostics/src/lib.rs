// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the fxload workspace.
//!
//! Every crate logs through the `info!`, `debug!`, `warn!` and `error!`
//! macros exported here, which forward to emit. Output goes to stderr so
//! that query results on stdout stay clean.
//!
//! Usage:
//! - Set FXLOAD_LOG=off (default) - no logs
//! - Set FXLOAD_LOG=info - job and statement progress
//! - Set FXLOAD_LOG=debug - per-statement detail

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init`].
pub const LOG_ENV: &str = "FXLOAD_LOG";

static INIT: Once = Once::new();

/// Minimum level of events written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    fn emit_level(self) -> Option<emit::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(emit::Level::Error),
            LogLevel::Warn => Some(emit::Level::Warn),
            LogLevel::Info => Some(emit::Level::Info),
            LogLevel::Debug => Some(emit::Level::Debug),
        }
    }
}

/// A log level name that is not one of off/error/warn/info/debug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level '{}'", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

/// Initialize logging from the FXLOAD_LOG environment variable, falling
/// back to `fallback` when the variable is unset.
///
/// Only the first call (of this or [`init_with_level`]) has an effect.
pub fn init(fallback: LogLevel) {
    let level = match std::env::var(LOG_ENV) {
        Ok(value) => match value.parse::<LogLevel>() {
            Ok(level) => level,
            Err(err) => {
                // Bootstrap warning, the emitter is not running yet.
                eprintln!("Warning: {err} in {LOG_ENV}, using 'info'");
                LogLevel::Info
            }
        },
        Err(_) => fallback,
    };
    init_with_level(level);
}

/// Initialize logging at a fixed level.
pub fn init_with_level(level: LogLevel) {
    INIT.call_once(|| {
        let Some(min) = level.emit_level() else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        // emit_term writes synchronously; the runtime lives for the process.
        std::mem::forget(rt);
    });
}

/// Log job and statement progress a user may want to see.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log per-statement and per-request detail.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable conditions: absent datasets, skipped exports.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that abort an operation.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("off".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert_eq!("".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!(" debug ".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(UnknownLevel("verbose".to_string()))
        );
    }

    #[test]
    fn test_off_has_no_emit_level() {
        assert!(LogLevel::Off.emit_level().is_none());
        assert_eq!(LogLevel::Warn.emit_level(), Some(emit::Level::Warn));
    }

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_with_level(LogLevel::Off);
        init_with_level(LogLevel::Debug);
        init(LogLevel::Off);
    }

    #[test]
    fn test_macros_compile() {
        let rows = 2;
        info!("Test message");
        debug!("Debug message with {rows}", rows: rows);
        warn!("Warning message");
        error!("Error message with {value}", value: 42);
    }
}
