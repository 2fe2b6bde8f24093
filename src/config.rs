//! Datadog Configuration
//!
//! Loaded from the environment (`DatadogConfig::from_env`) or from a TOML
//! file (`DatadogConfig::load`). Empty environment variables count as unset.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::log::{Level, TraceSinkConfig};

pub const DEFAULT_SERVICE_NAME: &str = "otel-dbm";
pub const DEFAULT_DB_SERVICE: &str = "testdb";
pub const DEFAULT_TRACE_AGENT_URL: &str = "http://127.0.0.1:8126";

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config file is not valid TOML for this schema
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Service identity, trace agent and log correlation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatadogConfig {
    /// Service name (`DD_SERVICE`, then `OTEL_SERVICE_NAME`)
    pub service_name: String,
    /// Explicit environment tag (`DD_ENV`); unset defers to resource attributes
    pub env: Option<String>,
    /// Service version (`DD_VERSION`)
    pub version: String,
    /// Database service reported in SQL comments (`DD_DBM_SERVICE`, then `DB_NAME`)
    pub db_service: String,
    /// Comma-separated `key=value` pairs (`OTEL_RESOURCE_ATTRIBUTES`)
    pub resource_attributes: String,
    /// APM agent URL (`DD_TRACE_AGENT_URL`)
    pub trace_addr: String,
    /// Fraction of traces kept, 0.0 to 1.0 (`DD_TRACE_SAMPLE_RATE`)
    pub trace_sample_rate: f64,
    /// JSON logs for the diagnostic subscriber (`DD_LOGS_INJECTION`)
    pub logs_injection: bool,
    /// Minimum level written by the application log sink (`DD_LOG_LEVEL`)
    pub log_level: Level,
    /// Include the call site in application log lines (`DD_LOG_SOURCE`)
    pub log_source: bool,
    /// Trace correlation key overrides
    pub logging: TraceSinkConfig,
}

impl Default for DatadogConfig {
    fn default() -> Self {
        DatadogConfig {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            env: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            db_service: DEFAULT_DB_SERVICE.to_string(),
            resource_attributes: String::new(),
            trace_addr: DEFAULT_TRACE_AGENT_URL.to_string(),
            trace_sample_rate: 1.0,
            logs_injection: false,
            log_level: Level::Info,
            log_source: true,
            logging: TraceSinkConfig::default(),
        }
    }
}

impl DatadogConfig {
    /// Build configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = DatadogConfig::default();

        let log_level = match get("DD_LOG_LEVEL").map(|v| v.to_lowercase()).as_deref() {
            Some("debug") => Level::Debug,
            Some("info") => Level::Info,
            Some("warn") | Some("warning") => Level::Warn,
            Some("error") => Level::Error,
            _ => defaults.log_level,
        };

        DatadogConfig {
            service_name: get("DD_SERVICE")
                .or_else(|| get("OTEL_SERVICE_NAME"))
                .unwrap_or(defaults.service_name),
            env: get("DD_ENV"),
            version: get("DD_VERSION").unwrap_or(defaults.version),
            db_service: get("DD_DBM_SERVICE")
                .or_else(|| get("DB_NAME"))
                .unwrap_or(defaults.db_service),
            resource_attributes: get("OTEL_RESOURCE_ATTRIBUTES").unwrap_or_default(),
            trace_addr: get("DD_TRACE_AGENT_URL").unwrap_or(defaults.trace_addr),
            trace_sample_rate: get("DD_TRACE_SAMPLE_RATE")
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|r| r.is_finite())
                .map(|r| r.clamp(0.0, 1.0))
                .unwrap_or(defaults.trace_sample_rate),
            logs_injection: get("DD_LOGS_INJECTION")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.logs_injection),
            log_level,
            log_source: get("DD_LOG_SOURCE")
                .map(|v| is_truthy(&v))
                .unwrap_or(defaults.log_source),
            logging: TraceSinkConfig {
                trace_id_key: get("DD_LOG_TRACE_ID_KEY"),
                span_id_key: get("DD_LOG_SPAN_ID_KEY"),
                trace_sampled_key: get("DD_LOG_TRACE_SAMPLED_KEY"),
            },
        }
    }

    /// Parse a TOML document; missing fields take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let mut config: DatadogConfig = toml::from_str(s)?;
        config.trace_sample_rate = if config.trace_sample_rate.is_finite() {
            config.trace_sample_rate.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if config.env.as_deref() == Some("") {
            config.env = None;
        }
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Environment the process reports to Datadog
    pub fn environment(&self) -> &str {
        crate::sql::resolve_environment(self.env.as_deref(), &self.resource_attributes)
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Parse comma-separated `key=value` pairs
///
/// Whitespace around keys and values is trimmed; entries without `=` or
/// with an empty key are skipped.
pub fn parse_key_values(s: &str) -> impl Iterator<Item = (&str, &str)> {
    s.split(',').filter_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key, value.trim()))
    })
}
