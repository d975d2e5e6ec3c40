//! Agent Gateway Library
//!
//! A multi-transport front door for an AI-agent provider: JSON CRUD routes
//! proxied upstream, and realtime chat over WebSocket and WebTransport.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod net;
pub mod observability;
pub mod routing;
pub mod session;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::AppState;
pub use lifecycle::Shutdown;
