//! Configuration management for ledgerweb
//!
//! This module handles loading, validation, and management of
//! ledgerweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for entry lists
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    50
}

/// Retry behavior for transient store failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts (not counting the initial attempt)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff before the first retry, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Ceiling for the backoff duration, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Multiplier applied to the backoff after each attempt
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

/// Workflow settings (bulk approvals and similar operations)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum concurrent items processed by a bulk operation
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            bulk_concurrency: default_bulk_concurrency(),
        }
    }
}

fn default_bulk_concurrency() -> usize {
    8
}

/// Batch import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Rows processed per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Maximum number of error messages retained in an import report
    #[serde(default = "default_max_error_messages")]
    pub max_error_messages: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_error_messages: default_max_error_messages(),
        }
    }
}

fn default_batch_size() -> usize {
    50
}

fn default_max_error_messages() -> usize {
    25
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Retry behavior for the entry store
    #[serde(default)]
    pub retry: RetryConfig,
    /// Workflow settings
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Batch import settings
    #[serde(default)]
    pub import: ImportConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound { path: path.to_string_lossy().to_string() })?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|_| ConfigError::InvalidYaml)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Records per page must be greater than 0".to_string(),
            });
        }

        if self.workflow.bulk_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workflow.bulk_concurrency".to_string(),
                reason: "Bulk concurrency must be greater than 0".to_string(),
            });
        }

        if self.import.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "import.batch_size".to_string(),
                reason: "Batch size must be greater than 0".to_string(),
            });
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.backoff_multiplier".to_string(),
                reason: "Backoff multiplier must be at least 1.0".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8082);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.pagination.records_per_page, 50);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.workflow.bulk_concurrency, 8);
        assert_eq!(config.import.batch_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let config: Config = serde_yaml::from_str("server:\n  port: 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), error::ConfigErrorCode::InvalidValue);
    }

    #[test]
    fn test_invalid_batch_size_rejected() {
        let config: Config = serde_yaml::from_str("import:\n  batch_size: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_template_parses() {
        let config: Config = serde_yaml::from_str(Config::generate_default()).unwrap();
        assert!(config.validate().is_ok());
    }
}
