//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup
//!     → tls.rs (install crypto provider, load PEM pair once)
//!     → listener.rs (bind TCP sockets for HTTP and HTTPS)
//!     → quinn / wtransport endpoints bind their own UDP sockets
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS material is shared by the TLS, HTTP/3, and WebTransport listeners
//! - Bind errors name the listener so a port clash is obvious in logs

pub mod listener;
pub mod tls;

pub use listener::{bind_tcp, resolve, ListenerError, ListenerKind};
pub use tls::{
    install_crypto_provider, load_quic_server_config, load_tls_config, load_webtransport_identity, TlsError,
};
