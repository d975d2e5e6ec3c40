//! Chat session subsystem.
//!
//! # Data Flow
//! ```text
//! Upgrade (WebSocket handler / WebTransport stream accept)
//!     → registry.rs (register, get SessionGuard)
//!     → transport.rs (frame carrier)
//!     → chat.rs (handshake → active → closed)
//!     → message.rs (decode, build reply)
//! ```
//!
//! # Design Decisions
//! - Each session runs in its own task and shares nothing with other sessions
//!   except the registry
//! - The state machine is transport-agnostic; carriers only move frames

pub mod chat;
pub mod message;
pub mod registry;
pub mod transport;

pub use chat::{ChatSession, CloseReason, SessionReport, SessionState};
pub use message::ChatMessage;
pub use registry::{SessionGuard, SessionId, SessionInfo, SessionKind, SessionRegistry};
pub use transport::{ChatTransport, LineTransport, TransportError};
