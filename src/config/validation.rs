//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check organization and function names are unique
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Request timeout must outlast the commit wait
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error(
        "timeouts.request_secs ({request_secs}) must exceed network.commit_timeout_secs ({commit_timeout_secs})"
    )]
    RequestTimeoutTooShort {
        request_secs: u64,
        commit_timeout_secs: u64,
    },

    #[error("organization name must not be empty")]
    EmptyOrganization,

    #[error("organization {0} is defined more than once")]
    DuplicateOrganization(String),

    #[error("function name must not be empty")]
    EmptyFunction,

    #[error("function {0} is defined more than once")]
    DuplicateFunction(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.network.commit_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("network.commit_timeout_secs"));
    }
    let (request_secs, commit_timeout_secs) =
        (config.timeouts.request_secs, config.network.commit_timeout_secs);
    if request_secs > 0 && commit_timeout_secs > 0 && request_secs <= commit_timeout_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs,
            commit_timeout_secs,
        });
    }

    let mut orgs = HashSet::new();
    for org in &config.organizations {
        if org.name.trim().is_empty() {
            errors.push(ValidationError::EmptyOrganization);
        } else if !orgs.insert(org.name.as_str()) {
            errors.push(ValidationError::DuplicateOrganization(org.name.clone()));
        }
    }

    let mut functions = HashSet::new();
    for function in &config.dispatch.functions {
        if function.name.trim().is_empty() {
            errors.push(ValidationError::EmptyFunction);
        } else if !functions.insert(function.name.as_str()) {
            errors.push(ValidationError::DuplicateFunction(function.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
