//! Configuration loading from disk.

use std::path::Path;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: RelayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_toml() {
        let toml = r#"
            [[upstreams]]
            name = "orders"
            base_url = "http://127.0.0.1:9001"
            spec_url = "http://127.0.0.1:9001/v3/api-docs"
        "#;
        let config: RelayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.upstreams.len(), 1);
        assert_eq!(config.merge.tag_prefix, "[B] ");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parses_merge_collision_knob() {
        let toml = r#"
            [merge]
            collision = "operation"
        "#;
        let config: RelayConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.merge.collision,
            crate::config::schema::PathCollision::Operation
        );
    }
}
