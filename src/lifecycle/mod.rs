//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load TLS → Build state and router → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Listeners stop accepting → Sessions close → Drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then TLS and state, then listeners
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: drain is bounded by configuration

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{run, StartupError};
