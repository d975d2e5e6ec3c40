//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ConfigValidationError};

pub const ENV_BASE_URL: &str = "AGENT_GATEWAY_UPSTREAM_BASE_URL";
pub const ENV_API_KEY: &str = "AGENT_GATEWAY_UPSTREAM_API_KEY";
pub const ENV_HOST: &str = "AGENT_GATEWAY_HOST";
pub const ENV_LOG_LEVEL: &str = "AGENT_GATEWAY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ConfigValidationError>),
}

fn join(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the environment, and validate configuration.
///
/// Without a path the defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides through `lookup` so callers can inject values.
pub fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_BASE_URL) {
        config.upstream.base_url = value;
    }
    if let Some(value) = lookup(ENV_API_KEY) {
        config.upstream.api_key = value;
    }
    if let Some(value) = lookup(ENV_HOST) {
        config.server.host = value;
    }
    if let Some(value) = lookup(ENV_LOG_LEVEL) {
        config.observability.log_level = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_file_values() {
        let mut config = parse_config(
            r#"
            [upstream]
            base_url = "http://file.example"
            api_key = "from-file"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_LOG_LEVEL, "debug"),
        ]
        .into_iter()
        .collect();
        apply_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.upstream.base_url, "http://file.example");
        assert_eq!(config.upstream.api_key, "from-env");
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn load_reports_validation_failures() {
        let path = std::env::temp_dir().join(format!(
            "agent-gateway-config-{}.toml",
            uuid::Uuid::new_v4()
        ));
        fs::write(&path, "[server]\nhttp_port = 6121\ntls_port = 6121\n").unwrap();

        let result = load_config(Some(&path));
        let _ = fs::remove_file(&path);

        match result {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors
                    .iter()
                    .any(|e| matches!(e, ConfigValidationError::TcpPortConflict { port: 6121, .. })));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            parse_config("[server\nhost ="),
            Err(ConfigError::Parse(_))
        ));
    }
}
