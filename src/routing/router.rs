//! Axum router construction from the route table.
//!
//! # Responsibilities
//! - Turn each [`Route`] into an axum method route bound to its handler
//! - Answer unmatched paths with 404 and wrong methods with 405, both JSON
//! - Wire up middleware shared by every request/response listener
//!
//! # Design Decisions
//! - One router instance serves plain HTTP, TLS, and HTTP/3
//! - Immutable after construction (thread-safe without locks)
//! - Middleware order: trace (outermost) → request ID → CORS → body limit → timeout

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, Uri};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::SecurityConfig;
use crate::http::request::with_request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::http::{agents, credentials, websocket};
use crate::routing::table::{Endpoint, Route, RouteTable};

/// Build the gateway router for `table`.
#[allow(deprecated)]
pub fn build_router(table: &RouteTable, state: AppState, security: &SecurityConfig) -> Router {
    let mut paths: Vec<(&'static str, MethodRouter<AppState>)> = Vec::new();
    for route in table.routes() {
        let Some(handler) = method_router(route) else {
            tracing::error!(method = %route.method, path = route.path, "Unsupported route method, skipping");
            continue;
        };
        match paths.iter_mut().find(|(path, _)| *path == route.path) {
            Some((_, existing)) => {
                let merged = std::mem::replace(existing, MethodRouter::new()).merge(handler);
                *existing = merged;
            }
            None => paths.push((route.path, handler)),
        }
    }

    let mut router = Router::new();
    for (path, methods) in paths {
        router = router.route(path, methods.fallback(method_not_allowed));
    }

    let mut router = router
        .fallback(not_found)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(security.request_timeout_secs)))
        .layer(DefaultBodyLimit::max(security.max_body_size));
    if security.permissive_cors {
        router = router.layer(CorsLayer::very_permissive());
    }
    with_request_id(router).layer(TraceLayer::new_for_http())
}

fn method_router(route: &Route) -> Option<MethodRouter<AppState>> {
    let filter = MethodFilter::try_from(route.method.clone()).ok()?;
    Some(match route.endpoint {
        Endpoint::CreateAgent => on(filter, agents::create_agent),
        Endpoint::ListAgents => on(filter, agents::list_agents),
        Endpoint::Chat => on(filter, websocket::chat_upgrade),
        Endpoint::CreateCredential => on(filter, credentials::create_credential),
    })
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}

async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(method.as_str(), uri.path())
}
