//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → table.rs (route lookup)
//!     → Return: matched Route, MethodNotAllowed, or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteTable::standard()
//!     → router.rs (one axum MethodRouter per path, shared middleware)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - The chat path is an ordinary route whose handler upgrades, then hands off
//! - Listeners that cannot upgrade consult the table and answer 426 for it

pub mod router;
pub mod table;

pub use router::build_router;
pub use table::{Endpoint, Route, RouteKind, RouteMatch, RouteTable, AGENTS_PATH, CHAT_PATH, CREDENTIALS_PATH};
