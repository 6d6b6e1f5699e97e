//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use holdem::TableConfig;
use std::net::SocketAddr;

pub const DEFAULT_BIND: &str = "127.0.0.1:12345";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Defaults applied to every created table
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables. CLI overrides
    /// win over the environment, the environment wins over defaults.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                DEFAULT_BIND
                    .parse()
                    .expect("Default bind address is valid")
            });

        let defaults = TableConfig::default();
        let table = TableConfig {
            max_seats: parse_env_or("TABLE_MAX_SEATS", defaults.max_seats),
            small_blind: parse_env_or("TABLE_SMALL_BLIND", defaults.small_blind),
            big_blind: parse_env_or("TABLE_BIG_BLIND", defaults.big_blind),
            starting_chips: parse_env_or("TABLE_STARTING_CHIPS", defaults.starting_chips),
        };

        let config = ServerConfig { bind, table };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "TABLE_*".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
