//! Static route table.
//!
//! # Responsibilities
//! - Declare every method + path the gateway serves
//! - Mark which routes are a single exchange and which hand off after upgrade
//! - Look up a request and return an explicit match result
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards
//! - Exact path match only; the route set is small and fixed
//! - Explicit NoMatch rather than silent default

use axum::http::Method;

pub const AGENTS_PATH: &str = "/v1/agents";
pub const CHAT_PATH: &str = "/v1/agents/chat";
pub const CREDENTIALS_PATH: &str = "/v1/credentials";

/// How a route uses its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// One request, one response.
    Exchange,
    /// Protocol upgrade, then a long-lived chat session.
    Upgrade,
}

/// Operation a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CreateAgent,
    ListAgents,
    Chat,
    CreateCredential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub path: &'static str,
    pub kind: RouteKind,
    pub endpoint: Endpoint,
}

/// Result of looking up a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Matched(&'a Route),
    /// Path exists, but not for this method.
    MethodNotAllowed,
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// The gateway's fixed route set.
    pub fn standard() -> Self {
        let route = |method, path, kind, endpoint| Route {
            method,
            path,
            kind,
            endpoint,
        };
        Self {
            routes: vec![
                route(Method::POST, AGENTS_PATH, RouteKind::Exchange, Endpoint::CreateAgent),
                route(Method::GET, AGENTS_PATH, RouteKind::Exchange, Endpoint::ListAgents),
                route(Method::GET, CHAT_PATH, RouteKind::Upgrade, Endpoint::Chat),
                route(Method::POST, CREDENTIALS_PATH, RouteKind::Exchange, Endpoint::CreateCredential),
            ],
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn match_request(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let mut path_known = false;
        for route in &self.routes {
            if route.path != path {
                continue;
            }
            if route.method == *method {
                return RouteMatch::Matched(route);
            }
            path_known = true;
        }

        if path_known {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NoMatch
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}
