//! Upstream agent-provider integration.
//!
//! # Data Flow
//! ```text
//! CRUD handler (payload already validated)
//!     → agents.rs (endpoint URL, auth header)
//!     → client.rs (serialize, shared pooled client, classify, decode)
//!     → types.rs (provider response shapes)
//! ```
//!
//! # Design Decisions
//! - The provider is opaque: only the three consumed endpoints are modelled
//! - Every call has a fixed overall timeout from configuration
//! - Errors keep enough detail (status, raw body) for callers to decide on retries

pub mod agents;
pub mod client;
pub mod error;
pub mod types;

pub use agents::AgentsApi;
pub use client::{shared_http_client, UpstreamClient};
pub use error::UpstreamError;
pub use types::{Agent, AgentResponse, CredentialResponse, ListAgentsResponse};
