use serde::{Deserialize, Serialize};

/// Main configuration structure for the dealflow engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Engine tuning knobs
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".dealflow/dealflow.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
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

    /// Log format: json, pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Engine tuning knobs for loop prevention, egress, and polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Minimum seconds between firings of the same automation for the same
    /// entity
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Maximum nesting depth of automation executions triggered by other
    /// automations' actions
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Timeout applied to each outbound webhook request
    #[serde(default = "default_webhook_timeout_secs")]
    pub webhook_timeout_secs: u64,

    /// Maximum candidate entities examined per automation per poller run
    #[serde(default = "default_poll_batch_limit")]
    pub poll_batch_limit: usize,
}

const fn default_cooldown_secs() -> u64 {
    60
}

const fn default_max_chain_depth() -> usize {
    3
}

const fn default_webhook_timeout_secs() -> u64 {
    30
}

const fn default_poll_batch_limit() -> usize {
    500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            max_chain_depth: default_max_chain_depth(),
            webhook_timeout_secs: default_webhook_timeout_secs(),
            poll_batch_limit: default_poll_batch_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_contract() {
        let config = Config::default();
        assert_eq!(config.engine.cooldown_secs, 60);
        assert_eq!(config.engine.max_chain_depth, 3);
        assert_eq!(config.engine.webhook_timeout_secs, 30);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config =
            serde_json::from_value(serde_json::json!({"engine": {"cooldown_secs": 5}})).unwrap();
        assert_eq!(config.engine.cooldown_secs, 5);
        assert_eq!(config.engine.max_chain_depth, 3);
        assert_eq!(config.database.max_connections, 10);
    }
}
