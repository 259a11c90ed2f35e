use std::env;
use std::fmt;

pub const DEFAULT_STORE_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "socium";
pub const DEFAULT_DATADOG_SITE: &str = "datadoghq.com";
pub const DEFAULT_METRIC_PREFIX: &str = "socium.v10";

/// Distinguishes runtime behavior for different stages of the agent.
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

/// Top-level configuration for the KPI agent and the fixture generator.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub store: StoreConfig,
    pub metrics: MetricsConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads a `.env` file if one is found, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Builds the configuration from process variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let store = StoreConfig {
            uri: non_blank_var("MONGODB_URI"),
            database: non_blank_var("MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        };

        let metric_prefix = non_blank_var("SOCIUM_METRIC_PREFIX")
            .unwrap_or_else(|| DEFAULT_METRIC_PREFIX.to_string());
        if metric_prefix.starts_with('.') || metric_prefix.ends_with('.') {
            return Err(ConfigError::InvalidMetricPrefix(metric_prefix));
        }

        let metrics = MetricsConfig {
            api_key: non_blank_var("DATADOG_API_KEY"),
            app_key: non_blank_var("DATADOG_APP_KEY"),
            site: non_blank_var("DATADOG_SITE")
                .unwrap_or_else(|| DEFAULT_DATADOG_SITE.to_string()),
            metric_prefix,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            store,
            metrics,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Connection settings for the operational document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub uri: Option<String>,
    pub database: String,
}

impl StoreConfig {
    /// Connection string for the KPI run, falling back to a local server.
    pub fn uri_or_default(&self) -> &str {
        self.uri.as_deref().unwrap_or(DEFAULT_STORE_URI)
    }

    /// Connection string for the fixture generator, which refuses to guess.
    pub fn require_uri(&self) -> Result<&str, ConfigError> {
        self.uri.as_deref().ok_or(ConfigError::MissingStoreUri)
    }
}

/// Datadog intake credentials and metric naming.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub api_key: Option<String>,
    pub app_key: Option<String>,
    pub site: String,
    pub metric_prefix: String,
}

impl MetricsConfig {
    pub fn intake_base_url(&self) -> String {
        format!("https://api.{}", self.site)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingStoreUri,
    InvalidMetricPrefix(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingStoreUri => write!(f, "MONGODB_URI is not set"),
            ConfigError::InvalidMetricPrefix(prefix) => write!(
                f,
                "SOCIUM_METRIC_PREFIX '{prefix}' must not start or end with '.'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
