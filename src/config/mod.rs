use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::matching::{MatchingConfig, MatchingConfigError};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let config_path = env::var("MATCHING_CONFIG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            matching: MatchingSettings { config_path },
        })
    }
}

/// Where the scoring tables come from.
#[derive(Debug, Clone, Default)]
pub struct MatchingSettings {
    /// JSON file with instruments and community focus; built-in tables when unset.
    pub config_path: Option<PathBuf>,
}

impl MatchingSettings {
    pub fn load_matching_config(&self) -> Result<Arc<MatchingConfig>, ConfigError> {
        let config = match &self.config_path {
            Some(path) => {
                MatchingConfig::from_path(path).map_err(|source| ConfigError::Matching {
                    path: path.clone(),
                    source,
                })?
            }
            None => MatchingConfig::standard(),
        };
        Ok(Arc::new(config))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Matching {
        path: PathBuf,
        source: MatchingConfigError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Matching { path, source } => {
                write!(f, "MATCHING_CONFIG {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Matching { source, .. } => Some(source),
        }
    }
}
