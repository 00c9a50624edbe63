//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Returns all violations, not just the first, so a broken config can be
//! fixed in one edit.

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::registry::RESERVED_SEGMENTS;

/// A single semantic violation in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("upstream name must not be empty")]
    EmptyName,

    #[error("upstream name '{0}' contains '/'")]
    NameContainsSlash(String),

    #[error("upstream name '{0}' collides with a reserved path segment")]
    ReservedName(String),

    #[error("duplicate upstream name '{0}' (names are case-insensitive)")]
    DuplicateName(String),

    #[error("upstream '{name}': invalid {field} '{value}'")]
    InvalidUrl {
        name: String,
        field: &'static str,
        value: String,
    },

    #[error("passthrough prefix '{0}' must start with '/'")]
    BadPassthroughPrefix(String),

    #[error("passthrough is enabled but target_base_url is empty")]
    MissingPassthroughTarget,

    #[error("server.public_url '{0}' is not a valid http(s) URL")]
    BadPublicUrl(String),
}

fn check_http_url(value: &str) -> bool {
    matches!(Url::parse(value), Ok(u) if u.scheme() == "http" || u.scheme() == "https")
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = Vec::new();

    for upstream in &config.upstreams {
        let lower = upstream.name.to_lowercase();

        if upstream.name.is_empty() {
            errors.push(ValidationError::EmptyName);
        } else if upstream.name.contains('/') {
            errors.push(ValidationError::NameContainsSlash(upstream.name.clone()));
        } else if RESERVED_SEGMENTS.contains(&lower.as_str()) {
            errors.push(ValidationError::ReservedName(upstream.name.clone()));
        }

        if seen.contains(&lower) {
            errors.push(ValidationError::DuplicateName(upstream.name.clone()));
        } else {
            seen.push(lower);
        }

        if !check_http_url(&upstream.base_url) {
            errors.push(ValidationError::InvalidUrl {
                name: upstream.name.clone(),
                field: "base_url",
                value: upstream.base_url.clone(),
            });
        }
        if !check_http_url(&upstream.spec_url) {
            errors.push(ValidationError::InvalidUrl {
                name: upstream.name.clone(),
                field: "spec_url",
                value: upstream.spec_url.clone(),
            });
        }
    }

    if config.passthrough.enabled {
        if !config.passthrough.prefix.starts_with('/') {
            errors.push(ValidationError::BadPassthroughPrefix(
                config.passthrough.prefix.clone(),
            ));
        }
        if config.passthrough.target_base_url.is_empty() {
            errors.push(ValidationError::MissingPassthroughTarget);
        } else if !check_http_url(&config.passthrough.target_base_url) {
            errors.push(ValidationError::InvalidUrl {
                name: "passthrough".to_string(),
                field: "target_base_url",
                value: config.passthrough.target_base_url.clone(),
            });
        }
    }

    if let Some(public_url) = &config.server.public_url {
        if !check_http_url(public_url) {
            errors.push(ValidationError::BadPublicUrl(public_url.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
