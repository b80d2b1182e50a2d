use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::models::DEFAULT_MAX_DOCUMENT_LENGTH;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Address both listeners bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the line-protocol editing server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port of the HTTP admin API
    #[serde(default = "default_admin_port")]
    pub admin_port: u16,

    /// Whether to serve the HTTP admin API at all
    #[serde(default = "default_admin_enabled")]
    pub admin_enabled: bool,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Longest accepted command line, in bytes
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,

    /// Number of compiled replace patterns kept around
    #[serde(default = "default_pattern_cache_capacity")]
    pub pattern_cache_capacity: u64,

    /// Longest text any document may grow to, in characters
    #[serde(default = "default_max_document_length")]
    pub max_document_length: usize,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Address of the editing server
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address of the admin API
    pub fn admin_address(&self) -> String {
        format!("{}:{}", self.host, self.admin_port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_port: default_admin_port(),
            admin_enabled: default_admin_enabled(),
            environment: default_environment(),
            log_level: default_log_level(),
            max_line_length: default_max_line_length(),
            pattern_cache_capacity: default_pattern_cache_capacity(),
            max_document_length: default_max_document_length(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvError(#[from] envy::Error),
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4444
}

fn default_admin_port() -> u16 {
    4445
}

fn default_admin_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_max_line_length() -> usize {
    64 * 1024
}

fn default_pattern_cache_capacity() -> u64 {
    256
}

fn default_max_document_length() -> usize {
    DEFAULT_MAX_DOCUMENT_LENGTH
}
