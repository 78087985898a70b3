//! Library configuration
//!
//! Configuration is resolved from:
//! - Default values
//! - Environment variables (`STASH_LOG`, `RUST_LOG`, `STASH_LOG_FORMAT`,
//!   `STASH_MAX_BUFFER_LEN`)
//! - A JSON document passed by the host at runtime

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default upper bound for a single input buffer view (256 MiB)
pub const DEFAULT_MAX_BUFFER_LEN: usize = 256 * 1024 * 1024;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level filter
    pub log_level: LogLevel,

    /// Log output format
    pub log_format: LogFormat,

    /// Largest input buffer view accepted by the gateway
    pub max_buffer_len: usize,
}

/// Log level accepted by `stash_set_log_level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    Compact,
    /// JSON structured output
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.merge_with_env();
        config
    }

    /// Parse a JSON configuration document; missing fields keep defaults
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::invalid_input("config", format!("invalid configuration: {}", e)))
    }

    /// Apply environment overrides. Invalid values are logged and ignored.
    pub fn merge_with_env(&mut self) {
        let level = std::env::var("STASH_LOG").or_else(|_| std::env::var("RUST_LOG"));
        if let Ok(level) = level {
            match level.parse() {
                Ok(level) => self.log_level = level,
                Err(_) => tracing::warn!("Invalid log level: {}, using default", level),
            }
        }

        if let Ok(format) = std::env::var("STASH_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.log_format = format,
                Err(_) => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }

        if let Ok(max) = std::env::var("STASH_MAX_BUFFER_LEN") {
            match max.parse::<usize>() {
                Ok(max) if max > 0 => self.max_buffer_len = max,
                _ => tracing::warn!("Invalid buffer limit: {}, using default", max),
            }
        }
    }
}

impl LogLevel {
    /// Directive understood by an `EnvFilter`
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(Error::invalid_input(
                "level",
                format!("unknown log level '{}'", other),
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::invalid_input(
                "format",
                format!("unknown log format '{}'", other),
            )),
        }
    }
}
