//! Startup orchestration.
//!
//! # Responsibilities
//! - Load TLS material and build shared state before anything listens
//! - Start the four listeners concurrently
//! - Apply the listener-failure policy
//! - Drain chat sessions on the way out
//!
//! # Design Decisions
//! - TLS material loads up front; a bad certificate is fatal at startup
//! - Each listener binds inside its own task, so one port conflict does not
//!   stop the others unless `exit_on_listener_failure` is set
//! - A gateway with no listener left is a failed run, whatever the policy
//! - Shutdown waits at most `shutdown_drain_secs` for sessions

use axum::Router;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::GatewayConfig;
use crate::http::http3::{bind_h3, serve_h3};
use crate::http::webtransport::{bind_webtransport, serve_webtransport, WebTransportState};
use crate::http::{serve_plain, serve_tls, with_alt_svc, AppState};
use crate::lifecycle::signals::spawn_signal_handler;
use crate::lifecycle::Shutdown;
use crate::net::{
    bind_tcp, install_crypto_provider, load_quic_server_config, load_tls_config,
    load_webtransport_identity, resolve, ListenerError, ListenerKind, TlsError,
};
use crate::observability::metrics;
use crate::routing::{build_router, RouteTable};
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),

    #[error("upstream client setup failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("listener failure: {0}")]
    Listener(#[from] ListenerError),
}

/// Run the gateway until shutdown.
///
/// Returns an error if startup fails, if a listener fails while
/// `exit_on_listener_failure` is set, or if every listener failed.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    let config = Arc::new(config);
    install_crypto_provider();

    if config.observability.metrics_enabled {
        match config.observability.metrics_socket_addr() {
            Some(addr) => metrics::init_metrics(addr),
            None => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let https_tls = load_tls_config(&config.tls).await?;
    let quic_tls = load_quic_server_config(&config.tls)?;
    let identity = load_webtransport_identity(&config.tls).await?;
    tracing::info!(cert = %config.tls.cert_path, "TLS material loaded");

    let shutdown = Arc::new(Shutdown::new());
    let state = AppState::new(&config, Arc::clone(&shutdown))?;
    let table = Arc::new(RouteTable::standard());
    let router = build_router(&table, state.clone(), &config.security);
    let drain = config.server.shutdown_drain();

    let mut listeners = JoinSet::new();

    spawn_listener(&mut listeners, ListenerKind::Http, {
        let address = config.server.http_address();
        let router = router.clone();
        let shutdown = Arc::clone(&shutdown);
        async move {
            let addr = resolve(ListenerKind::Http, &address).await?;
            let listener = bind_tcp(ListenerKind::Http, addr).await?;
            serve_plain(listener, router, shutdown).await
        }
    });

    spawn_listener(&mut listeners, ListenerKind::Https, {
        let address = config.server.tls_address();
        let router: Router = with_alt_svc(router.clone(), config.server.h3_port);
        let shutdown = Arc::clone(&shutdown);
        async move {
            let addr = resolve(ListenerKind::Https, &address).await?;
            let listener = bind_tcp(ListenerKind::Https, addr).await?;
            serve_tls(listener, https_tls, router, shutdown, drain).await
        }
    });

    spawn_listener(&mut listeners, ListenerKind::Http3, {
        let address = config.server.h3_address();
        let router = router.clone();
        let table = Arc::clone(&table);
        let max_body_size = config.security.max_body_size;
        let shutdown = Arc::clone(&shutdown);
        async move {
            let addr = resolve(ListenerKind::Http3, &address).await?;
            let endpoint = bind_h3(addr, quic_tls)?;
            serve_h3(endpoint, router, table, max_body_size, shutdown, drain).await
        }
    });

    spawn_listener(&mut listeners, ListenerKind::WebTransport, {
        let address = config.server.webtransport_address();
        let wt_state = WebTransportState {
            sessions: Arc::clone(&state.sessions),
            chat: config.chat.clone(),
            shutdown: Arc::clone(&shutdown),
        };
        async move {
            let addr = resolve(ListenerKind::WebTransport, &address).await?;
            let endpoint = bind_webtransport(addr, identity)?;
            serve_webtransport(endpoint, wt_state, drain).await
        }
    });

    let signals = spawn_signal_handler(Arc::clone(&shutdown));
    tracing::info!("Gateway started");

    let total = listeners.len();
    let mut failed = 0;
    let mut first_failure = None;
    while let Some(joined) = listeners.join_next().await {
        let failure = match joined {
            Ok((kind, Ok(()))) => {
                tracing::info!(listener = %kind, "Listener exited");
                None
            }
            Ok((kind, Err(e))) => {
                tracing::error!(listener = %kind, error = %e, "Listener failed");
                Some(e)
            }
            Err(e) => {
                tracing::error!(error = %e, "Listener task aborted");
                None
            }
        };

        if let Some(e) = failure {
            failed += 1;
            first_failure.get_or_insert(e);
            if config.server.exit_on_listener_failure {
                shutdown.trigger();
            }
        }
    }

    shutdown.trigger();
    let active = state.sessions.len();
    if active > 0 {
        tracing::info!(active, drain_secs = drain.as_secs(), "Draining chat sessions");
        if !state.sessions.wait_until_empty(drain).await {
            tracing::warn!(remaining = state.sessions.len(), "Chat sessions still open after drain");
        }
    }
    signals.abort();

    let every_listener_failed = failed == total;
    match first_failure {
        Some(e) if config.server.exit_on_listener_failure || every_listener_failed => Err(e.into()),
        _ => {
            tracing::info!("Shutdown complete");
            Ok(())
        }
    }
}

fn spawn_listener<F>(
    set: &mut JoinSet<(ListenerKind, Result<(), ListenerError>)>,
    kind: ListenerKind,
    listener: F,
) where
    F: Future<Output = Result<(), ListenerError>> + Send + 'static,
{
    set.spawn(async move { (kind, listener.await) });
}
