//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP / TLS connection            QUIC connection
//!     → server.rs (axum serve)        → http3.rs (request streams)
//!           \                            /
//!            → routing::build_router (shared Router)
//!                → request.rs (request ID)
//!                → agents.rs / credentials.rs → upstream
//!                → websocket.rs (upgrade → session)
//!                → response.rs (JSON errors)
//!
//! QUIC connection (WebTransport)
//!     → webtransport.rs (session per stream, no router)
//! ```

pub mod agents;
pub mod credentials;
pub mod http3;
pub mod request;
pub mod response;
pub mod server;
pub mod webtransport;
pub mod websocket;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{serve_plain, serve_tls, with_alt_svc, AppState};
