//! Engine and logging configuration.
//!
//! Every field has a serde default so partial YAML files and env overrides
//! merge cleanly on top of `Config::default()`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the journey engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Minimum seconds between two firings of one trigger for one user
    #[serde(default = "default_throttle_window_secs")]
    pub throttle_window_secs: u64,

    /// Page views kept per user (oldest dropped first)
    #[serde(default = "default_max_page_views")]
    pub max_page_views: usize,

    /// Interactions kept per user (oldest dropped first)
    #[serde(default = "default_max_interactions")]
    pub max_interactions: usize,

    /// Recompute the engagement score on updates that do not supply one
    #[serde(default)]
    pub derive_engagement_score: bool,

    /// YAML trigger catalog; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Capacity of the broadcast channel used by async listeners
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

const fn default_throttle_window_secs() -> u64 {
    60
}

const fn default_max_page_views() -> usize {
    200
}

const fn default_max_interactions() -> usize {
    200
}

const fn default_event_channel_capacity() -> usize {
    1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            throttle_window_secs: default_throttle_window_secs(),
            max_page_views: default_max_page_views(),
            max_interactions: default_max_interactions(),
            derive_engagement_score: false,
            catalog_path: None,
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for the console layer
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for log files (console only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Enable console logging (written to stderr)
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

/// Console log format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable multi-line output
    #[default]
    Pretty,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// New file every day
    #[default]
    Daily,
    /// New file every hour
    Hourly,
    /// Single file, never rotated
    Never,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}
