//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits, windows and timeouts > 0)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.chat_url '{0}' is not an http(s) URL")]
    ChatUrl(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("rate_limit.client_ip_header '{0}' is not a valid header name")]
    ClientIpHeader(String),

    #[error("cors.allowed_origins must not be empty")]
    NoOrigins,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match url::Url::parse(&config.upstream.chat_url) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
        _ => errors.push(ValidationError::ChatUrl(config.upstream.chat_url.clone())),
    }

    let positive: [(&'static str, u64); 7] = [
        ("rate_limit.max_requests", config.rate_limit.max_requests as u64),
        ("rate_limit.window_ms", config.rate_limit.window_ms),
        ("rate_limit.sweep_interval_secs", config.rate_limit.sweep_interval_secs),
        ("fetch.timeout_ms", config.fetch.timeout_ms),
        ("fetch.max_chars", config.fetch.max_chars as u64),
        ("fetch.max_page_bytes", config.fetch.max_page_bytes as u64),
        ("security.max_body_size", config.security.max_body_size as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    if config.timeouts.chat_secs == Some(0) {
        errors.push(ValidationError::Zero { field: "timeouts.chat_secs" });
    }

    if HeaderName::from_bytes(config.rate_limit.client_ip_header.as_bytes()).is_err() {
        errors.push(ValidationError::ClientIpHeader(
            config.rate_limit.client_ip_header.clone(),
        ));
    }

    if config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::NoOrigins);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
