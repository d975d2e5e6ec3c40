//! HTTP server setup for the TCP listeners.
//!
//! # Responsibilities
//! - Hold the state shared by every handler and listener
//! - Serve the router over plain HTTP and over TLS
//! - Advertise HTTP/3 on the TLS listener
//! - Stop accepting when shutdown is triggered

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{ChatConfig, GatewayConfig};
use crate::lifecycle::Shutdown;
use crate::net::{ListenerError, ListenerKind};
use crate::session::SessionRegistry;
use crate::upstream::{AgentsApi, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub agents: Arc<AgentsApi>,
    pub sessions: Arc<SessionRegistry>,
    pub shutdown: Arc<Shutdown>,
    pub chat: ChatConfig,
}

impl AppState {
    pub fn new(config: &GatewayConfig, shutdown: Arc<Shutdown>) -> Result<Self, UpstreamError> {
        Ok(Self {
            agents: Arc::new(AgentsApi::new(&config.upstream)?),
            sessions: Arc::new(SessionRegistry::new()),
            shutdown,
            chat: config.chat.clone(),
        })
    }
}

/// Add `Alt-Svc` so clients of the TLS listener can discover HTTP/3.
pub fn with_alt_svc(router: Router, h3_port: u16) -> Router {
    match HeaderValue::from_str(&format!("h3=\":{h3_port}\"; ma=86400")) {
        Ok(value) => router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("alt-svc"),
            value,
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid Alt-Svc value, not advertising HTTP/3");
            router
        }
    }
}

/// Serve `router` over plain HTTP until shutdown.
pub async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: Arc<Shutdown>,
) -> Result<(), ListenerError> {
    let kind = ListenerKind::Http;
    let addr = listener
        .local_addr()
        .map_err(|e| ListenerError::serve(kind, e))?;
    tracing::info!(listener = %kind, address = %addr, "HTTP server starting");

    let mut signal = shutdown.subscribe();
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move { signal.recv().await })
        .await
        .map_err(|e| ListenerError::serve(kind, e))?;

    tracing::info!(listener = %kind, "HTTP server stopped");
    Ok(())
}

/// Serve `router` over TLS until shutdown, then give open connections
/// up to `drain` to finish.
pub async fn serve_tls(
    listener: TcpListener,
    tls: RustlsConfig,
    router: Router,
    shutdown: Arc<Shutdown>,
    drain: Duration,
) -> Result<(), ListenerError> {
    let kind = ListenerKind::Https;
    let listener = listener
        .into_std()
        .map_err(|e| ListenerError::serve(kind, e))?;
    let addr = listener
        .local_addr()
        .map_err(|e| ListenerError::serve(kind, e))?;
    tracing::info!(listener = %kind, address = %addr, "HTTPS server starting");

    let handle = axum_server::Handle::new();
    let watcher = handle.clone();
    let mut signal = shutdown.subscribe();
    tokio::spawn(async move {
        signal.recv().await;
        watcher.graceful_shutdown(Some(drain));
    });

    axum_server::from_tcp_rustls(listener, tls)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| ListenerError::serve(kind, e))?;

    tracing::info!(listener = %kind, "HTTPS server stopped");
    Ok(())
}
