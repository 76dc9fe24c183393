//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid max_chain_depth: {0}. Must be between 1 and 10")]
    InvalidMaxChainDepth(usize),

    #[error("Invalid webhook_timeout_secs: {0}. Must be between 1 and 300")]
    InvalidWebhookTimeout(u64),

    #[error("Invalid poll_batch_limit: {0}. Must be at least 1")]
    InvalidPollBatchLimit(usize),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .dealflow/config.yaml (project config)
    /// 3. .dealflow/local.yaml (local overrides, optional)
    /// 4. Environment variables (DEALFLOW_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".dealflow/config.yaml"))
            .merge(Yaml::file(".dealflow/local.yaml"))
            .merge(Env::prefixed("DEALFLOW_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.engine.max_chain_depth == 0 || config.engine.max_chain_depth > 10 {
            return Err(ConfigError::InvalidMaxChainDepth(
                config.engine.max_chain_depth,
            ));
        }
        if config.engine.webhook_timeout_secs == 0 || config.engine.webhook_timeout_secs > 300 {
            return Err(ConfigError::InvalidWebhookTimeout(
                config.engine.webhook_timeout_secs,
            ));
        }
        if config.engine.poll_batch_limit == 0 {
            return Err(ConfigError::InvalidPollBatchLimit(
                config.engine.poll_batch_limit,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ConfigLoader::validate(&Config::default()).is_ok());
    }

    #[test]
    fn out_of_range_engine_values_are_rejected() {
        let config = Config {
            engine: crate::domain::models::config::EngineConfig {
                max_chain_depth: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxChainDepth(0))
        ));

        let config = Config {
            engine: crate::domain::models::config::EngineConfig {
                webhook_timeout_secs: 301,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidWebhookTimeout(301))
        ));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let config = Config {
            logging: crate::domain::models::config::LoggingConfig {
                level: "verbose".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
