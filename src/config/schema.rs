//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener addresses and process-level policy.
    pub server: ServerConfig,

    /// Certificate material shared by every TLS-based listener.
    pub tls: TlsConfig,

    /// Upstream agent-provider API.
    pub upstream: UpstreamConfig,

    /// Realtime chat session settings.
    pub chat: ChatConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration, one port per protocol.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Plain HTTP port (TCP).
    pub http_port: u16,

    /// TLS HTTP/1.1 port (TCP).
    pub tls_port: u16,

    /// HTTP/3 port (UDP). May share its number with `tls_port`.
    pub h3_port: u16,

    /// WebTransport port (UDP).
    pub webtransport_port: u16,

    /// Shut the whole process down when any listener fails.
    /// When false a failed listener is logged and the others keep serving.
    pub exit_on_listener_failure: bool,

    /// Upper bound on waiting for chat sessions to finish during shutdown.
    pub shutdown_drain_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
            tls_port: 6121,
            h3_port: 6121,
            webtransport_port: 6122,
            exit_on_listener_failure: false,
            shutdown_drain_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn tls_address(&self) -> String {
        format!("{}:{}", self.host, self.tls_port)
    }

    pub fn h3_address(&self) -> String {
        format!("{}:{}", self.host, self.h3_port)
    }

    pub fn webtransport_address(&self) -> String {
        format!("{}:{}", self.host, self.webtransport_port)
    }

    pub fn shutdown_drain(&self) -> Duration {
        Duration::from_secs(self.shutdown_drain_secs)
    }
}

/// TLS configuration for the TLS, HTTP/3 and WebTransport listeners.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: "cert.pem".to_string(),
            key_path: "key.pem".to_string(),
        }
    }
}

/// How the API key is presented to the upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamAuth {
    /// `Authorization: Bearer <key>`.
    #[default]
    Bearer,
    /// `x-api-key: <key>`.
    ApiKey,
}

/// Upstream agent-provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the provider API (e.g., "https://agent-prod.studio.lyzr.ai").
    pub base_url: String,

    /// API key sent with every call.
    pub api_key: String,

    /// Header scheme used for the API key.
    pub auth: UpstreamAuth,

    /// Overall per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Connection establishment (TCP + TLS handshake) timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum idle pooled connections kept per upstream host.
    pub pool_max_idle_per_host: usize,

    /// Idle pooled connections are closed after this many seconds.
    pub pool_idle_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://agent-prod.studio.lyzr.ai".to_string(),
            api_key: String::new(),
            auth: UpstreamAuth::Bearer,
            request_timeout_secs: 15,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 100,
            pool_idle_timeout_secs: 90,
        }
    }
}

/// Chat session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Close a session after this many seconds without an inbound frame.
    /// Zero disables the timeout.
    pub idle_timeout_secs: u64,

    /// Maximum size of one newline-delimited frame on a WebTransport stream.
    pub max_frame_bytes: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 0,
            max_frame_bytes: 64 * 1024,
        }
    }
}

impl ChatConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Allow any origin, method and header (credentials included).
    pub permissive_cors: bool,

    /// Timeout for a single request/response exchange in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            permissive_cors: true,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn metrics_socket_addr(&self) -> Option<SocketAddr> {
        self.metrics_address.parse().ok()
    }
}
