//! WebSocket chat upgrade.
//!
//! # Responsibilities
//! - Complete the upgrade handshake on `GET /v1/agents/chat`
//! - Register the connection as a session and hand it to the chat state machine
//! - Adapt axum's WebSocket to the frame transport used by sessions
//!
//! # Data Flow
//! ```text
//! Client ── upgrade ──▶ chat_upgrade ──▶ SessionRegistry::register
//!                                     └─▶ ChatSession<WsTransport>::run
//! ```
//!
//! # Design Decisions
//! - Any origin may upgrade
//! - Text and binary frames are both chat frames; ping/pong handled transparently
//! - A request that cannot upgrade gets a JSON 426, not axum's plain-text rejection

use axum::body::Body;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::net::SocketAddr;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::session::{ChatSession, ChatTransport, SessionKind, TransportError};

/// `GET /v1/agents/chat`
pub async fn chat_upgrade(
    State(state): State<AppState>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    request: Request<Body>,
) -> Response {
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Chat request without usable upgrade");
            return ApiError::upgrade_required(request.uri().path()).into_response();
        }
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    upgrade
        .max_message_size(state.chat.max_frame_bytes)
        .on_failed_upgrade(|e| tracing::warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| run_chat(state, socket, peer))
}

async fn run_chat(state: AppState, socket: WebSocket, peer: Option<SocketAddr>) {
    let guard = state.sessions.register(SessionKind::WebSocket, peer);
    let session = ChatSession::new(
        WsTransport::new(socket),
        guard,
        state.shutdown.subscribe(),
        state.chat.idle_timeout(),
    );
    session.run().await;
}

/// [`ChatTransport`] over an upgraded axum WebSocket.
pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl ChatTransport for WsTransport {
    async fn recv(&mut self) -> Result<Option<Bytes>, TransportError> {
        while let Some(message) = self.socket.recv().await {
            match message.map_err(|e| TransportError::Read(e.to_string()))? {
                Message::Text(text) => return Ok(Some(Bytes::copy_from_slice(text.as_str().as_bytes()))),
                Message::Binary(data) => return Ok(Some(data)),
                Message::Close(_) => return Ok(None),
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
        Ok(None)
    }

    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.socket
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(mut self) {
        if let Err(e) = self.socket.send(Message::Close(None)).await {
            tracing::trace!(error = %e, "Close frame not sent");
        }
    }
}
