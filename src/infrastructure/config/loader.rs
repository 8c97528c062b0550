//! Figment-based configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local config directory.
pub const CONFIG_DIR: &str = ".brainsait";

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "BRAINSAIT_";

/// Upper bound for `throttle_window_secs` (one year).
pub const MAX_THROTTLE_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Throttle window is zero or longer than [`MAX_THROTTLE_WINDOW_SECS`]
    #[error("Invalid throttle_window_secs: {0}. Must be between 1 and 31536000")]
    InvalidThrottleWindow(u64),

    /// Page view history bound is zero
    #[error("Invalid max_page_views: {0}. Must be at least 1")]
    InvalidMaxPageViews(usize),

    /// Interaction history bound is zero
    #[error("Invalid max_interactions: {0}. Must be at least 1")]
    InvalidMaxInteractions(usize),

    /// Broadcast channel capacity is zero
    #[error("Invalid event_channel_capacity: {0}. Must be at least 1")]
    InvalidChannelCapacity(usize),

    /// Log level is not a tracing level name
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .brainsait/config.yaml
    /// 3. .brainsait/local.yaml (optional overrides)
    /// 4. Environment variables (BRAINSAIT_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::file(format!("{CONFIG_DIR}/config.yaml")))
            .merge(Yaml::file(format!("{CONFIG_DIR}/local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Self::base()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base() -> Figment {
        Figment::new().merge(Serialized::defaults(Config::default()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let engine = &config.engine;

        if engine.throttle_window_secs == 0
            || engine.throttle_window_secs > MAX_THROTTLE_WINDOW_SECS
        {
            return Err(ConfigError::InvalidThrottleWindow(engine.throttle_window_secs));
        }

        if engine.max_page_views == 0 {
            return Err(ConfigError::InvalidMaxPageViews(engine.max_page_views));
        }

        if engine.max_interactions == 0 {
            return Err(ConfigError::InvalidMaxInteractions(engine.max_interactions));
        }

        if engine.event_channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity(
                engine.event_channel_capacity,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, RotationPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.engine.throttle_window_secs, 60);
        assert_eq!(config.engine.max_page_views, 200);
        assert!(!config.engine.derive_engagement_score);
        assert!(config.engine.catalog_path.is_none());
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
engine:
  throttle_window_secs: 120
  derive_engagement_score: true
  catalog_path: triggers.yaml
logging:
  level: debug
  format: json
  rotation: hourly
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.engine.throttle_window_secs, 120);
        assert!(config.engine.derive_engagement_score);
        assert_eq!(
            config.engine.catalog_path.as_deref(),
            Some(std::path::Path::new("triggers.yaml"))
        );
        assert_eq!(config.engine.max_interactions, 200, "unset fields keep defaults");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.rotation, RotationPolicy::Hourly);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_zero_throttle_window() {
        let mut config = Config::default();
        config.engine.throttle_window_secs = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidThrottleWindow(0))
        ));
    }

    #[test]
    fn test_validate_oversized_throttle_window() {
        let mut config = Config::default();
        config.engine.throttle_window_secs = MAX_THROTTLE_WINDOW_SECS;
        ConfigLoader::validate(&config).expect("upper bound itself is valid");

        config.engine.throttle_window_secs = u64::MAX;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidThrottleWindow(u64::MAX))
        ));
    }

    #[test]
    fn test_validate_zero_history_bounds() {
        let mut config = Config::default();
        config.engine.max_page_views = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxPageViews(0))
        ));

        let mut config = Config::default();
        config.engine.max_interactions = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxInteractions(0))
        ));
    }

    #[test]
    fn test_validate_zero_channel_capacity() {
        let mut config = Config::default();
        config.engine.event_channel_capacity = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidChannelCapacity(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "engine:\n  throttle_window_secs: 30\n  max_page_views: 50\nlogging:\n  level: warn"
        )
        .expect("write config");
        file.flush().expect("flush config");

        temp_env::with_vars(
            [
                ("BRAINSAIT_ENGINE__THROTTLE_WINDOW_SECS", Some("90")),
                ("BRAINSAIT_LOGGING__LEVEL", None),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).expect("config loads");
                assert_eq!(config.engine.throttle_window_secs, 90, "env wins");
                assert_eq!(config.engine.max_page_views, 50, "file value persists");
                assert_eq!(config.logging.level, "warn");
            },
        );
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "engine:\n  max_interactions: 0").expect("write config");
        file.flush().expect("flush config");

        temp_env::with_vars_unset(
            ["BRAINSAIT_ENGINE__MAX_INTERACTIONS"],
            || {
                let err = ConfigLoader::load_from_file(file.path()).expect_err("zero is rejected");
                assert!(err.to_string().contains("max_interactions"));
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().expect("temp file");
        writeln!(
            base_file,
            "engine:\n  throttle_window_secs: 5\nlogging:\n  level: info\n  format: json"
        )
        .expect("write base");
        base_file.flush().expect("flush base");

        let mut override_file = NamedTempFile::new().expect("temp file");
        writeln!(
            override_file,
            "engine:\n  throttle_window_secs: 15\nlogging:\n  level: debug"
        )
        .expect("write override");
        override_file.flush().expect("flush override");

        let config: Config = ConfigLoader::base()
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .expect("merged config");

        assert_eq!(config.engine.throttle_window_secs, 15, "Override should win");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }
}
