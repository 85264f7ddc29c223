use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Seeded admin account
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,

    // Background session sweep
    pub session_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/forum.sqlite")),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,

            // Seeded admin account
            admin_username: env_or_default("ADMIN_USERNAME", "admin"),
            admin_email: env_or_default("ADMIN_EMAIL", "admin@admin.com"),
            admin_password: env_or_default("ADMIN_PASSWORD", "change-me-on-first-login"),

            // Background session sweep
            session_sweep_interval: Duration::from_secs(parse_env_u64(
                "SESSION_SWEEP_INTERVAL_SECS",
                3600,
            )?),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_username.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "ADMIN_USERNAME".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.admin_password.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "ADMIN_PASSWORD".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.session_sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_SWEEP_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
