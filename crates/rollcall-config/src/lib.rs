//! Configuration parsing and validation for rollcalld
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Server, storage and attendance-policy sections
//! - Validation with clear error messages

mod config;
mod schema;
mod validation;

pub use config::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Config::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1
        "#;

        let config = parse_config(config).unwrap();
        assert_eq!(config.attendance.late_threshold, Duration::from_secs(15 * 60));
        assert_eq!(config.attendance.clock_interval, Duration::from_secs(60));
        assert_eq!(config.attendance.materializer_hour, 0);
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [server]
            bind_addr = "0.0.0.0:9000"

            [storage]
            data_dir = "/var/lib/rollcall"

            [attendance]
            late_threshold_minutes = 10
            clock_interval_seconds = 30
            materializer_hour = 5
        "#;

        let config = parse_config(config).unwrap();
        assert_eq!(config.server.bind_addr.port(), 9000);
        assert_eq!(
            config.storage.data_dir,
            std::path::PathBuf::from("/var/lib/rollcall")
        );
        assert_eq!(config.attendance.late_threshold, Duration::from_secs(600));
        assert_eq!(config.attendance.materializer_hour, 5);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_values() {
        let config = r#"
            config_version = 1

            [server]
            bind_addr = "not-an-address"

            [attendance]
            late_threshold_minutes = 0
            materializer_hour = 24
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => {
                // All three problems reported at once
                assert_eq!(errors.len(), 3);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
