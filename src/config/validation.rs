//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream target can actually be built
//! - Validate value ranges (timeouts > 0, port valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::proxy::UpstreamTarget;

const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.scheme `{0}` is not supported (expected `http` or `https`)")]
    UnsupportedScheme(String),

    #[error("api.host must not be empty")]
    EmptyHost,

    #[error("api.host `{0}` is not a valid host")]
    InvalidHost(String),

    #[error("port must not be 0")]
    ZeroPort,

    #[error("root must not be empty")]
    EmptyRoot,

    #[error("{0} must be greater than 0")]
    ZeroValue(&'static str),
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !SUPPORTED_SCHEMES.contains(&config.api.scheme.as_str()) {
        errors.push(ValidationError::UnsupportedScheme(config.api.scheme.clone()));
    }

    if config.api.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    } else if UpstreamTarget::new("http", &config.api.host).is_err() {
        errors.push(ValidationError::InvalidHost(config.api.host.clone()));
    }

    if config.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.root.trim().is_empty() {
        errors.push(ValidationError::EmptyRoot);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.limits.login_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.login_body_bytes"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
