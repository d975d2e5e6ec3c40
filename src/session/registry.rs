//! Active chat session tracking.
//!
//! # Responsibilities
//! - Assign a unique ID to every upgraded connection or stream
//! - Record transport kind, peer, creation and last-activity times
//! - Let shutdown wait for sessions to drain
//!
//! # Design Decisions
//! - One entry per physical connection/stream, nothing carried across reconnects
//! - Entries are only touched through the owning session's guard
//! - Guard removes the entry on drop, so a panicking session still deregisters

use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use uuid::Uuid;

use crate::observability::metrics;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sess-{}", self.0)
    }
}

/// Transport that carried the upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    WebSocket,
    WebTransportStream,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::WebSocket => "websocket",
            SessionKind::WebTransportStream => "webtransport",
        }
    }
}

/// Metadata for one registered session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: SessionId,
    pub kind: SessionKind,
    pub peer: Option<SocketAddr>,
    pub created_at: SystemTime,
    pub last_activity: Instant,
}

/// Tracks every live chat session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionInfo>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session. The returned guard deregisters it on drop.
    pub fn register(self: &Arc<Self>, kind: SessionKind, peer: Option<SocketAddr>) -> SessionGuard {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            SessionInfo {
                id,
                kind,
                peer,
                created_at: SystemTime::now(),
                last_activity: Instant::now(),
            },
        );
        metrics::record_session_opened(kind.as_str());
        metrics::set_active_sessions(self.sessions.len());

        SessionGuard {
            registry: Arc::clone(self),
            id,
            kind,
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionInfo> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Wait until no sessions remain or `limit` elapses.
    /// Returns true if the registry drained.
    pub async fn wait_until_empty(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while !self.is_empty() {
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        true
    }
}

/// Ownership token for one registry entry.
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    id: SessionId,
    kind: SessionKind,
}

impl SessionGuard {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Record inbound activity.
    pub fn touch(&self) {
        if let Some(mut entry) = self.registry.sessions.get_mut(&self.id) {
            entry.last_activity = Instant::now();
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.sessions.remove(&self.id);
        metrics::set_active_sessions(self.registry.sessions.len());
        tracing::trace!(session_id = %self.id, "Session deregistered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn guards_register_and_deregister() {
        let registry = Arc::new(SessionRegistry::new());
        assert!(registry.is_empty());

        let ws = registry.register(SessionKind::WebSocket, None);
        let wt = registry.register(SessionKind::WebTransportStream, "127.0.0.1:5000".parse().ok());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(&wt.id()).unwrap().kind, SessionKind::WebTransportStream);

        drop(ws);
        assert_eq!(registry.len(), 1);
        drop(wt);
        assert!(registry.is_empty());
    }

    #[test]
    fn touch_advances_last_activity() {
        let registry = Arc::new(SessionRegistry::new());
        let guard = registry.register(SessionKind::WebSocket, None);
        let before = registry.get(&guard.id()).unwrap().last_activity;
        std::thread::sleep(Duration::from_millis(5));
        guard.touch();
        assert!(registry.get(&guard.id()).unwrap().last_activity > before);
    }

    #[tokio::test]
    async fn wait_until_empty_respects_limit() {
        let registry = Arc::new(SessionRegistry::new());
        let guard = registry.register(SessionKind::WebSocket, None);
        assert!(!registry.wait_until_empty(Duration::from_millis(100)).await);

        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.wait_until_empty(Duration::from_secs(5)).await })
        };
        drop(guard);
        assert!(waiter.await.unwrap());
    }
}
