//! Configuration file
//!
//! Every section is optional; command-line flags override what is set here.
//!
//! ```toml
//! [drain]
//! max_depth = 4
//! max_children = 100
//! similarity_threshold = 0.4
//! delimiters = " \t_"
//!
//! [tail]
//! lines = "10"
//! poll_interval_ms = 250
//!
//! [funnel]
//! channel_capacity = 10000
//! checkpoint_interval_secs = 30
//! progress_every = 10000
//!
//! [log]
//! level = "info"
//! format = "console"
//! ```

use drain_core::DrainConfig;
use drain_tail::{FromLine, FunnelConfig, TailOptions};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - section rejected as a whole
    #[error("invalid [{section}] section: {message}")]
    InvalidSection {
        /// Config section
        section: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// Validation error - invalid value
    #[error("invalid value for {section}.{field}: {message}")]
    InvalidValue {
        /// Config section
        section: &'static str,
        /// Field name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - very verbose
    Trace,
    /// Debug level - debugging information
    Debug,
    /// Info level - normal operation (default)
    #[default]
    Info,
    /// Warn level - warnings only
    Warn,
    /// Error level - errors only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// JSON structured logging
    Json,
}

/// Logging configuration
///
/// Logs always go to stderr; stdout carries the mined clusters.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: LogLevel,

    /// Output format (console, json)
    pub format: LogFormat,
}

/// File tailing settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TailConfig {
    /// Starting line: `"N"` for the last N lines, `"+N"` to start at line N
    pub lines: String,

    /// Polling interval in follow mode
    pub poll_interval_ms: u64,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            lines: FromLine::default().to_string(),
            poll_interval_ms: 250,
        }
    }
}

impl TailConfig {
    /// Parsed starting line, falling back to the default if invalid
    pub fn from_line(&self) -> FromLine {
        self.lines.parse().unwrap_or_default()
    }

    /// Tailing options for this section
    pub fn options(&self, follow: bool) -> TailOptions {
        TailOptions::default()
            .with_from_line(self.from_line())
            .with_follow(follow)
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }
}

/// Engine settings
///
/// Mining splits on `_` as well as whitespace, so identifiers such as
/// `session_42` yield a stable `session` token and a variable one.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrainSection {
    /// Depth of the prefix tree
    pub max_depth: usize,

    /// Maximum literal children per tree node
    pub max_children: usize,

    /// Minimum similarity for a line to join a cluster
    pub similarity_threshold: f64,

    /// Characters that separate tokens
    pub delimiters: String,
}

/// Delimiters mining adds to the engine's whitespace set
const MINING_DELIMITERS: &str = "_";

impl Default for DrainSection {
    fn default() -> Self {
        let defaults = DrainConfig::default().with_additional_delimiters(MINING_DELIMITERS);
        Self {
            max_depth: defaults.max_depth,
            max_children: defaults.max_children,
            similarity_threshold: defaults.similarity_threshold,
            delimiters: defaults.delimiters,
        }
    }
}

impl DrainSection {
    /// Engine configuration for this section
    pub fn engine_config(&self) -> DrainConfig {
        DrainConfig::default()
            .with_max_depth(self.max_depth)
            .with_max_children(self.max_children)
            .with_similarity_threshold(self.similarity_threshold)
            .with_delimiters(self.delimiters.as_str())
    }
}

/// Funnel settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FunnelSection {
    /// Line queue capacity
    pub channel_capacity: usize,

    /// Seconds between state checkpoints in follow mode
    pub checkpoint_interval_secs: u64,

    /// Lines between progress logs
    pub progress_every: u64,
}

impl Default for FunnelSection {
    fn default() -> Self {
        let defaults = FunnelConfig::default();
        Self {
            channel_capacity: defaults.channel_capacity,
            checkpoint_interval_secs: defaults.checkpoint_interval.as_secs(),
            progress_every: defaults.progress_every,
        }
    }
}

impl FunnelSection {
    /// Funnel configuration for this section
    pub fn funnel_config(&self) -> FunnelConfig {
        FunnelConfig::default()
            .with_channel_capacity(self.channel_capacity)
            .with_checkpoint_interval(Duration::from_secs(self.checkpoint_interval_secs))
            .with_progress_every(self.progress_every)
    }
}

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Engine tuning
    pub drain: DrainSection,

    /// File tailing
    pub tail: TailConfig,

    /// Line funnel
    pub funnel: FunnelSection,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.drain
            .engine_config()
            .validate()
            .map_err(|message| ConfigError::InvalidSection {
                section: "drain",
                message,
            })?;

        if let Err(e) = self.tail.lines.parse::<FromLine>() {
            return Err(invalid("tail", "lines", e.to_string()));
        }

        if self.tail.poll_interval_ms == 0 {
            return Err(invalid("tail", "poll_interval_ms", "must be greater than 0"));
        }

        if self.funnel.channel_capacity == 0 {
            return Err(invalid("funnel", "channel_capacity", "must be greater than 0"));
        }

        if self.funnel.checkpoint_interval_secs == 0 {
            return Err(invalid(
                "funnel",
                "checkpoint_interval_secs",
                "must be greater than 0",
            ));
        }

        if self.funnel.progress_every == 0 {
            return Err(invalid("funnel", "progress_every", "must be greater than 0"));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn invalid(section: &'static str, field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section,
        field,
        message: message.into(),
    }
}
