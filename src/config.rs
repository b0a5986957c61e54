use serde::{Deserialize, Serialize};
use std::fs;

use crate::orders::{ConflictChecker, ConflictWindow, WindowMode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; in-memory store when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Conflict window and write serialization
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BookingConfig {
    pub window_hours: i64,
    pub window_mode: WindowMode,
    /// Per-service locks around check-and-write
    pub serialize_writes: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            window_hours: ConflictWindow::DEFAULT_HOURS,
            window_mode: WindowMode::Trailing,
            serialize_writes: false,
        }
    }
}

impl BookingConfig {
    pub fn checker(&self) -> ConflictChecker {
        ConflictChecker::new(ConflictWindow::hours(self.window_hours, self.window_mode))
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, then apply environment overrides
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config =
            Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
                path: config_path,
                source,
            })?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.postgres_url = Some(url);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.booking.window_hours <= 0 {
            return Err(ConfigError::Invalid(format!(
                "booking.window_hours must be positive, got {}",
                self.booking.window_hours
            )));
        }
        Ok(())
    }
}
