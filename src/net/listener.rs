//! Listener identities and socket binding.
//!
//! # Responsibilities
//! - Name the four listeners for logs, metrics, and request extensions
//! - Bind TCP sockets with errors that carry the listener and address

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

/// Which listener accepted a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Plain HTTP/1.1 over TCP.
    Http,
    /// HTTP/1.1 over TLS.
    Https,
    /// HTTP/3 over QUIC.
    Http3,
    /// WebTransport over QUIC.
    WebTransport,
}

impl ListenerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerKind::Http => "http",
            ListenerKind::Https => "https",
            ListenerKind::Http3 => "http3",
            ListenerKind::WebTransport => "webtransport",
        }
    }
}

impl std::fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("{kind} listener address {address} did not resolve: {source}")]
    Resolve {
        kind: ListenerKind,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} listener failed to bind {address}: {source}")]
    Bind {
        kind: ListenerKind,
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} listener stopped: {message}")]
    Serve { kind: ListenerKind, message: String },
}

impl ListenerError {
    pub fn kind(&self) -> ListenerKind {
        match self {
            ListenerError::Resolve { kind, .. }
            | ListenerError::Bind { kind, .. }
            | ListenerError::Serve { kind, .. } => *kind,
        }
    }

    pub(crate) fn serve(kind: ListenerKind, err: impl std::fmt::Display) -> Self {
        ListenerError::Serve {
            kind,
            message: err.to_string(),
        }
    }
}

/// Resolve `host:port` to the first socket address it names.
pub async fn resolve(kind: ListenerKind, address: &str) -> Result<SocketAddr, ListenerError> {
    let failed = |source| ListenerError::Resolve {
        kind,
        address: address.to_string(),
        source,
    };
    tokio::net::lookup_host(address)
        .await
        .map_err(failed)?
        .next()
        .ok_or_else(|| failed(std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses")))
}

/// Bind a TCP listener for `kind` at `address`.
pub async fn bind_tcp(kind: ListenerKind, address: SocketAddr) -> Result<TcpListener, ListenerError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind {
            kind,
            address,
            source,
        })?;

    let local = listener.local_addr().unwrap_or(address);
    tracing::info!(listener = %kind, address = %local, "Listener bound");
    Ok(listener)
}
