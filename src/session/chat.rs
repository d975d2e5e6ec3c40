//! Per-connection chat state machine.
//!
//! # Data Flow
//! ```text
//! Handshake ──first frame──▶ Active ──read/write error, peer close,
//!     │                        │        idle timeout, shutdown──▶ Closed
//!     └────read error──────────┴──────────────────────────────────▶ Closed
//! ```
//!
//! # Design Decisions
//! - The first frame is an opaque handshake: logged, never answered
//! - Undecodable frames are dropped; the session keeps going
//! - Every decoded frame gets exactly one reply, in arrival order
//! - The transport is closed exactly once, when the session ends

use bytes::Bytes;
use std::time::Duration;

use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::session::message::ChatMessage;
use crate::session::registry::SessionGuard;
use crate::session::transport::ChatTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Handshake,
    Active,
    Closed,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    PeerClosed,
    ReadError,
    WriteError,
    IdleTimeout,
    Shutdown,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::PeerClosed => "peer_closed",
            CloseReason::ReadError => "read_error",
            CloseReason::WriteError => "write_error",
            CloseReason::IdleTimeout => "idle_timeout",
            CloseReason::Shutdown => "shutdown",
        }
    }
}

/// Outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub reason: CloseReason,
    pub replies: u64,
    pub dropped: u64,
}

/// One chat conversation bound to one transport.
pub struct ChatSession<T> {
    transport: T,
    guard: SessionGuard,
    shutdown: ShutdownSignal,
    idle_timeout: Option<Duration>,
    state: SessionState,
    replies: u64,
    dropped: u64,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(
        transport: T,
        guard: SessionGuard,
        shutdown: ShutdownSignal,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            guard,
            shutdown,
            idle_timeout,
            state: SessionState::Handshake,
            replies: 0,
            dropped: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session to completion, then release the transport and
    /// the registry entry.
    pub async fn run(mut self) -> SessionReport {
        tracing::info!(
            session_id = %self.guard.id(),
            kind = self.guard.kind().as_str(),
            "Chat session opened"
        );
        let reason = self.drive().await;
        self.finish(reason).await
    }

    async fn drive(&mut self) -> CloseReason {
        let handshake = match self.next_frame().await {
            Ok(frame) => frame,
            Err(reason) => return reason,
        };
        tracing::debug!(
            session_id = %self.guard.id(),
            initial = %String::from_utf8_lossy(&handshake),
            "Handshake received"
        );
        self.transition(SessionState::Active);

        loop {
            let frame = match self.next_frame().await {
                Ok(frame) => frame,
                Err(reason) => return reason,
            };

            let message = match ChatMessage::decode(&frame) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(session_id = %self.guard.id(), error = %e, "Dropping malformed chat frame");
                    metrics::record_malformed_message(self.guard.kind().as_str());
                    self.dropped += 1;
                    continue;
                }
            };
            tracing::debug!(session_id = %self.guard.id(), message_id = %message.id, "Chat message received");

            let reply = match message.into_reply().encode() {
                Ok(reply) => reply,
                Err(e) => {
                    tracing::error!(session_id = %self.guard.id(), error = %e, "Failed to encode reply");
                    self.dropped += 1;
                    continue;
                }
            };

            if let Err(e) = self.transport.send(reply).await {
                tracing::warn!(session_id = %self.guard.id(), error = %e, "Chat write failed");
                return CloseReason::WriteError;
            }
            self.replies += 1;
            metrics::record_chat_reply(self.guard.kind().as_str());
        }
    }

    /// Read the next frame, honoring the idle timeout and shutdown.
    async fn next_frame(&mut self) -> Result<Bytes, CloseReason> {
        let frame = tokio::select! {
            result = read_frame(&mut self.transport, self.idle_timeout) => result?,
            _ = self.shutdown.recv() => return Err(CloseReason::Shutdown),
        };
        self.guard.touch();
        Ok(frame)
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!(session_id = %self.guard.id(), from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    async fn finish(mut self, reason: CloseReason) -> SessionReport {
        self.transition(SessionState::Closed);
        let ChatSession {
            transport,
            guard,
            replies,
            dropped,
            ..
        } = self;

        transport.close().await;

        let kind = guard.kind().as_str();
        metrics::record_session_closed(kind, reason.as_str());
        tracing::info!(
            session_id = %guard.id(),
            kind,
            reason = reason.as_str(),
            replies,
            dropped,
            "Chat session closed"
        );
        drop(guard);

        SessionReport {
            reason,
            replies,
            dropped,
        }
    }
}

async fn read_frame<T: ChatTransport>(
    transport: &mut T,
    idle_timeout: Option<Duration>,
) -> Result<Bytes, CloseReason> {
    let result = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, transport.recv())
            .await
            .map_err(|_| CloseReason::IdleTimeout)?,
        None => transport.recv().await,
    };

    match result {
        Ok(Some(frame)) => Ok(frame),
        Ok(None) => Err(CloseReason::PeerClosed),
        Err(e) => {
            tracing::debug!(error = %e, "Chat read failed");
            Err(CloseReason::ReadError)
        }
    }
}
