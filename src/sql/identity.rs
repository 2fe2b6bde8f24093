//! Service Identity for SQL Correlation
//!
//! Who is issuing the statement: database service, process service and
//! version, and where the deployment environment comes from.

use crate::config::{parse_key_values, DatadogConfig};

/// Environment used when neither an override nor a resource attribute names one
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Resource attribute keys consulted for the environment, in order
pub const ENVIRONMENT_RESOURCE_KEYS: [&str; 2] =
    ["deployment.environment", "deployment.environment.name"];

/// Identity fields embedded into correlation comments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceIdentity {
    pub db_service: String,
    pub service: String,
    pub version: String,
    /// Explicit environment, wins over resource attributes
    pub env_override: Option<String>,
    /// Comma-separated `key=value` resource attributes
    pub resource_attributes: String,
}

impl ServiceIdentity {
    pub fn new(
        db_service: impl Into<String>,
        service: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ServiceIdentity {
            db_service: db_service.into(),
            service: service.into(),
            version: version.into(),
            env_override: None,
            resource_attributes: String::new(),
        }
    }

    pub fn from_config(config: &DatadogConfig) -> Self {
        ServiceIdentity {
            db_service: config.db_service.clone(),
            service: config.service_name.clone(),
            version: config.version.clone(),
            env_override: config.env.clone(),
            resource_attributes: config.resource_attributes.clone(),
        }
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env_override = Some(env.into());
        self
    }

    pub fn with_resource_attributes(mut self, attrs: impl Into<String>) -> Self {
        self.resource_attributes = attrs.into();
        self
    }

    /// Override, then resource attributes, then `DEFAULT_ENVIRONMENT`
    pub fn environment(&self) -> &str {
        resolve_environment(self.env_override.as_deref(), &self.resource_attributes)
    }
}

/// Resolve the deployment environment
///
/// Empty values count as unset at every step.
pub fn resolve_environment<'a>(env_override: Option<&'a str>, resource_attributes: &'a str) -> &'a str {
    if let Some(env) = env_override.filter(|e| !e.is_empty()) {
        return env;
    }
    parse_key_values(resource_attributes)
        .find(|(key, value)| ENVIRONMENT_RESOURCE_KEYS.contains(key) && !value.is_empty())
        .map(|(_, value)| value)
        .unwrap_or(DEFAULT_ENVIRONMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_resource_attributes() {
        assert_eq!(
            resolve_environment(None, "deployment.environment=staging,foo=bar"),
            "staging"
        );
    }

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve_environment(Some("prod"), "deployment.environment=staging"),
            "prod"
        );
    }

    #[test]
    fn test_empty_override_ignored() {
        assert_eq!(
            resolve_environment(Some(""), "deployment.environment=staging"),
            "staging"
        );
    }

    #[test]
    fn test_fallback_default() {
        assert_eq!(resolve_environment(None, ""), DEFAULT_ENVIRONMENT);
        assert_eq!(resolve_environment(None, "foo=bar,baz"), DEFAULT_ENVIRONMENT);
        assert_eq!(
            resolve_environment(None, "deployment.environment="),
            DEFAULT_ENVIRONMENT
        );
    }

    #[test]
    fn test_whitespace_and_newer_key() {
        assert_eq!(
            resolve_environment(None, " foo = bar , deployment.environment.name = qa "),
            "qa"
        );
    }

    #[test]
    fn test_identity_from_config() {
        let config = DatadogConfig {
            env: Some("advent".to_string()),
            ..DatadogConfig::default()
        };
        let identity = ServiceIdentity::from_config(&config);
        assert_eq!(identity.environment(), "advent");
        assert_eq!(identity.service, config.service_name);
        assert_eq!(identity.db_service, config.db_service);
    }
}
