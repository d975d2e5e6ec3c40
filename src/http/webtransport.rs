//! WebTransport listener.
//!
//! # Responsibilities
//! - Accept WebTransport sessions on the chat path and reject every other path
//! - Turn each bidirectional stream of a session into its own chat session
//!
//! # Data Flow
//! ```text
//! wtransport::Endpoint::accept
//!     → SessionRequest (path check) → Connection (one task)
//!     → accept_bi (one task per stream)
//!     → LineTransport → ChatSession::run
//! ```
//!
//! # Design Decisions
//! - Streams carry newline-delimited JSON frames
//! - A stream is handed off as soon as it is accepted; the connection task
//!   keeps accepting more

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use wtransport::endpoint::endpoint_side::Server;
use wtransport::{Connection, Endpoint, Identity, ServerConfig, VarInt};

use crate::config::ChatConfig;
use crate::lifecycle::Shutdown;
use crate::net::{ListenerError, ListenerKind};
use crate::routing::CHAT_PATH;
use crate::session::{ChatSession, LineTransport, SessionKind, SessionRegistry};

const KEEP_ALIVE: Duration = Duration::from_secs(3);

/// Shared state for WebTransport connection tasks.
#[derive(Clone)]
pub struct WebTransportState {
    pub sessions: Arc<SessionRegistry>,
    pub chat: ChatConfig,
    pub shutdown: Arc<Shutdown>,
}

/// Bind the WebTransport endpoint.
pub fn bind_webtransport(address: SocketAddr, identity: Identity) -> Result<Endpoint<Server>, ListenerError> {
    let config = ServerConfig::builder()
        .with_bind_address(address)
        .with_identity(identity)
        .keep_alive_interval(Some(KEEP_ALIVE))
        .build();

    let endpoint = Endpoint::server(config).map_err(|source| ListenerError::Bind {
        kind: ListenerKind::WebTransport,
        address,
        source,
    })?;
    tracing::info!(listener = %ListenerKind::WebTransport, address = %address, "Listener bound");
    Ok(endpoint)
}

/// Accept WebTransport sessions until shutdown.
pub async fn serve_webtransport(
    endpoint: Endpoint<Server>,
    state: WebTransportState,
    drain: Duration,
) -> Result<(), ListenerError> {
    let kind = ListenerKind::WebTransport;
    let mut signal = state.shutdown.subscribe();

    loop {
        let incoming = tokio::select! {
            incoming = endpoint.accept() => incoming,
            _ = signal.recv() => break,
        };

        let state = state.clone();
        tokio::spawn(async move {
            let request = match incoming.await {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!(listener = %kind, error = %e, "WebTransport handshake failed");
                    return;
                }
            };

            if request.path() != CHAT_PATH {
                tracing::debug!(listener = %kind, path = request.path(), "WebTransport session for unknown path");
                request.not_found().await;
                return;
            }

            match request.accept().await {
                Ok(connection) => serve_connection(connection, state).await,
                Err(e) => tracing::debug!(listener = %kind, error = %e, "WebTransport session accept failed"),
            }
        });
    }

    endpoint.close(VarInt::from_u32(0), b"shutdown");
    if tokio::time::timeout(drain, endpoint.wait_idle()).await.is_err() {
        tracing::warn!(listener = %kind, "WebTransport connections did not drain in time");
    }
    tracing::info!(listener = %kind, "WebTransport server stopped");
    Ok(())
}

async fn serve_connection(connection: Connection, state: WebTransportState) {
    let peer = connection.remote_address();
    let mut signal = state.shutdown.subscribe();
    tracing::debug!(peer = %peer, "WebTransport session established");

    loop {
        let accepted = tokio::select! {
            accepted = connection.accept_bi() => accepted,
            _ = signal.recv() => {
                connection.close(VarInt::from_u32(0), b"shutdown");
                break;
            }
        };

        let (send, recv) = match accepted {
            Ok(streams) => streams,
            Err(e) => {
                tracing::debug!(peer = %peer, error = %e, "WebTransport session ended");
                break;
            }
        };

        let guard = state.sessions.register(SessionKind::WebTransportStream, Some(peer));
        let session = ChatSession::new(
            LineTransport::new(recv, send, state.chat.max_frame_bytes),
            guard,
            state.shutdown.subscribe(),
            state.chat.idle_timeout(),
        );
        tokio::spawn(session.run());
    }
}
