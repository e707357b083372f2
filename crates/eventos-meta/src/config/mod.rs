use std::env;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

/// Distinguishes runtime behavior for different stages of the deployment.
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
    pub classification: ClassificationConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let reference_date = match env::var("EVENTOS_REFERENCE_DATE") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_reference_date(&raw)?),
            _ => None,
        };

        let dataset_path = env::var("EVENTOS_DATASET")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            classification: ClassificationConfig { reference_date },
            storage: StorageConfig { dataset_path },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_reference_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|source| {
        ConfigError::InvalidReferenceDate {
            value: raw.to_string(),
            source,
        }
    })
}

/// Knobs for the ranking engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationConfig {
    /// Fixes "today" for age computation; the clock's date is used when unset.
    pub reference_date: Option<NaiveDate>,
}

/// Where the CLI finds its dataset when no path is given explicitly.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub dataset_path: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidReferenceDate {
        value: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidReferenceDate { value, .. } => write!(
                f,
                "EVENTOS_REFERENCE_DATE must be formatted as YYYY-MM-DD (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidReferenceDate { source, .. } => Some(source),
        }
    }
}
