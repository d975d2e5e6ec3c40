//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check listener ports do not collide on the same transport
//! - Validate value ranges (timeouts > 0) and the upstream URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ConfigValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("{first} and {second} both use TCP port {port}")]
    TcpPortConflict {
        first: &'static str,
        second: &'static str,
        port: u16,
    },

    #[error("{first} and {second} both use UDP port {port}")]
    UdpPortConflict {
        first: &'static str,
        second: &'static str,
        port: u16,
    },

    #[error("upstream.base_url '{0}' is not an http(s) URL")]
    InvalidBaseUrl(String),

    #[error("upstream.api_key must not be empty")]
    MissingApiKey,

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ConfigValidationError::EmptyHost);
    }

    // HTTP and TLS share TCP; HTTP/3 and WebTransport share UDP.
    if config.server.http_port == config.server.tls_port {
        errors.push(ConfigValidationError::TcpPortConflict {
            first: "server.http_port",
            second: "server.tls_port",
            port: config.server.http_port,
        });
    }
    if config.server.h3_port == config.server.webtransport_port {
        errors.push(ConfigValidationError::UdpPortConflict {
            first: "server.h3_port",
            second: "server.webtransport_port",
            port: config.server.h3_port,
        });
    }

    match url::Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ConfigValidationError::InvalidBaseUrl(
            config.upstream.base_url.clone(),
        )),
    }

    if config.upstream.api_key.trim().is_empty() {
        errors.push(ConfigValidationError::MissingApiKey);
    }

    let positive = [
        ("upstream.request_timeout_secs", config.upstream.request_timeout_secs),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("security.request_timeout_secs", config.security.request_timeout_secs),
        ("security.max_body_size", config.security.max_body_size as u64),
        ("chat.max_frame_bytes", config.chat.max_frame_bytes as u64),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ConfigValidationError::ZeroValue(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
