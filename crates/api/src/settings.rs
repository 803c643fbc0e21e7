//! Application Configuration
//!
//! An optional file (`config/bikeshare.toml` by default) layered under
//! `BIKESHARE__*` environment variables, e.g. `BIKESHARE__AUTH__TOKEN` or
//! `BIKESHARE__DATABASE__URL`.

use crate::rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use service::FeedConfig;
use std::net::SocketAddr;
use std::time::Duration;
use storage::StorageConfig;
use thiserror::Error;

/// Default configuration file, without extension
pub const DEFAULT_CONFIG_PATH: &str = "config/bikeshare";

/// Environment variable prefix
const ENV_PREFIX: &str = "BIKESHARE";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("auth.token must be set")]
    MissingToken,

    #[error("Invalid bind address {addr}: {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("Invalid log format {0:?}, expected \"text\" or \"json\"")]
    InvalidLogFormat(String),
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub addr: String,
    /// Deadline for outbound fetches made on behalf of a request (seconds)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.addr.parse().map_err(|source| ConfigError::InvalidAddr {
            addr: self.addr.clone(),
            source,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Static bearer token guarding `/api/v1`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token: String,
}

/// Subscriber settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: StorageConfig,
    pub feeds: FeedConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from `path` (missing file allowed) and the environment
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        self.server.socket_addr()?;
        if !matches!(self.logging.format.to_ascii_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::InvalidLogFormat(self.logging.format.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            auth: AuthConfig {
                token: "secret".to_string(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.database.operation_timeout_secs, 5);
        assert_eq!(config.feeds.units, "imperial");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = AppConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingToken)));

        let mut blank = valid();
        blank.auth.token = "   ".to_string();
        assert!(matches!(blank.validate(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_invalid_addr_rejected() {
        let mut config = valid();
        config.server.addr = "localhost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddr { .. })
        ));
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        let mut config = valid();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        config.logging.format = "JSON".to_string();
        assert!(config.validate().is_ok());
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_missing_file_still_requires_token() {
        // No file and no BIKESHARE__AUTH__TOKEN in the test environment.
        let result = AppConfig::load_from("does/not/exist/bikeshare");
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }
}
