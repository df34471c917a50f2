//! Configuration structures for the ticker and its demo main loop.
//!
//! Supports TOML deserialization with defaults for every field, so an
//! empty file is a valid configuration.

use crate::rate::Rate;
use crate::time::{checked_ms_to_ticks, MAX_INTERVAL_TICKS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Top-level ticker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Counter ticks per millisecond of the time source.
    pub ticks_per_ms: u32,

    /// Demo main-loop configuration.
    pub demo: DemoConfig,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            ticks_per_ms: 1,
            demo: DemoConfig::default(),
        }
    }
}

/// Settings for the demo main loop driven by `ticker-daemon`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Sleep between tick calls.
    #[serde(with = "humantime_serde")]
    pub loop_interval: Duration,

    /// Rate at which the blink indicator toggles.
    pub blink_rate: Rate,

    /// Rate at which a status line is logged.
    pub status_rate: Rate,

    /// Interval of the periodic heartbeat task.
    #[serde(with = "humantime_serde")]
    pub heartbeat_interval: Duration,

    /// Blocking delay before entering the main loop.
    #[serde(with = "humantime_serde")]
    pub startup_delay: Duration,

    /// Stop after this many tick calls (0 = run until signalled).
    pub max_ticks: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            loop_interval: Duration::from_millis(1),
            blink_rate: Rate::Hz5,
            status_rate: Rate::Hz1,
            heartbeat_interval: Duration::from_millis(250),
            startup_delay: Duration::ZERO,
            max_ticks: 0,
        }
    }
}

impl TickerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Read config file");
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check values that parse but cannot be honoured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero tick ratio or for
    /// durations whose tick count exceeds the wraparound horizon.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_ms == 0 {
            return Err(ConfigError::Invalid("ticks_per_ms must be at least 1".into()));
        }

        let horizon_ms = MAX_INTERVAL_TICKS / self.ticks_per_ms;
        for (name, duration) in [
            ("demo.heartbeat_interval", self.demo.heartbeat_interval),
            ("demo.startup_delay", self.demo.startup_delay),
        ] {
            let ms = duration_to_ms(duration).filter(|ms| *ms <= horizon_ms);
            if ms.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "{name} of {} exceeds the {horizon_ms}ms wraparound horizon",
                    humantime::format_duration(duration)
                )));
            }
        }

        Ok(())
    }

    /// Convert a duration to counter ticks using this configuration's ratio.
    ///
    /// Returns `None` when the result would not fit the wraparound horizon.
    #[must_use]
    pub fn duration_to_ticks(&self, duration: Duration) -> Option<u32> {
        checked_ms_to_ticks(duration_to_ms(duration)?, self.ticks_per_ms)
    }
}

/// Whole milliseconds in `duration`, if they fit in a `u32`.
#[must_use]
pub fn duration_to_ms(duration: Duration) -> Option<u32> {
    u32::try_from(duration.as_millis()).ok()
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Semantically invalid value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
