//! HTTP/3 listener.
//!
//! # Responsibilities
//! - Accept QUIC connections and HTTP/3 request streams
//! - Normalize each request into the same axum router the TCP listeners use
//! - Refuse upgrade-only routes, which HTTP/3 request streams cannot carry
//!
//! # Data Flow
//! ```text
//! quinn::Endpoint::accept
//!     → h3::server::Connection (one task per connection)
//!     → accept request stream (one task per request)
//!     → buffer body → Router::oneshot → buffer response → send
//! ```
//!
//! # Design Decisions
//! - Bodies are buffered on both sides; CRUD payloads are small JSON documents
//! - The route table is consulted before dispatch so the chat path answers 426

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use axum::response::IntoResponse;
use axum::Router;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use h3::server::RequestStream;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::http::response::ApiError;
use crate::lifecycle::Shutdown;
use crate::net::{ListenerError, ListenerKind};
use crate::routing::{RouteKind, RouteMatch, RouteTable};

type H3Stream = RequestStream<h3_quinn::BidiStream<Bytes>, Bytes>;

/// Everything a request task needs.
#[derive(Clone)]
struct Dispatch {
    router: Router,
    table: Arc<RouteTable>,
    max_body_size: usize,
}

/// Bind the QUIC endpoint for HTTP/3.
pub fn bind_h3(address: SocketAddr, config: quinn::ServerConfig) -> Result<quinn::Endpoint, ListenerError> {
    let endpoint = quinn::Endpoint::server(config, address).map_err(|source| ListenerError::Bind {
        kind: ListenerKind::Http3,
        address,
        source,
    })?;
    tracing::info!(listener = %ListenerKind::Http3, address = %address, "Listener bound");
    Ok(endpoint)
}

/// Serve HTTP/3 on `endpoint` until shutdown.
pub async fn serve_h3(
    endpoint: quinn::Endpoint,
    router: Router,
    table: Arc<RouteTable>,
    max_body_size: usize,
    shutdown: Arc<Shutdown>,
    drain: Duration,
) -> Result<(), ListenerError> {
    let kind = ListenerKind::Http3;
    let dispatch = Dispatch {
        router,
        table,
        max_body_size,
    };
    let mut signal = shutdown.subscribe();

    loop {
        let incoming = tokio::select! {
            incoming = endpoint.accept() => incoming,
            _ = signal.recv() => break,
        };
        let Some(incoming) = incoming else {
            return Err(ListenerError::serve(kind, "endpoint closed"));
        };

        let dispatch = dispatch.clone();
        tokio::spawn(async move {
            match incoming.await {
                Ok(conn) => serve_connection(conn, dispatch).await,
                Err(e) => tracing::debug!(listener = %kind, error = %e, "QUIC handshake failed"),
            }
        });
    }

    endpoint.close(0u32.into(), b"shutdown");
    if tokio::time::timeout(drain, endpoint.wait_idle()).await.is_err() {
        tracing::warn!(listener = %kind, "QUIC connections did not drain in time");
    }
    tracing::info!(listener = %kind, "HTTP/3 server stopped");
    Ok(())
}

async fn serve_connection(conn: quinn::Connection, dispatch: Dispatch) {
    let peer = conn.remote_address();
    let mut h3_conn = match h3::server::Connection::<_, Bytes>::new(h3_quinn::Connection::new(conn)).await {
        Ok(h3_conn) => h3_conn,
        Err(e) => {
            tracing::debug!(peer = %peer, error = %e, "HTTP/3 connection setup failed");
            return;
        }
    };

    loop {
        match h3_conn.accept().await {
            Ok(Some((request, stream))) => {
                let dispatch = dispatch.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_request(request, stream, peer, dispatch).await {
                        tracing::debug!(peer = %peer, error = %e, "HTTP/3 request stream failed");
                    }
                });
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(peer = %peer, error = %e, "HTTP/3 connection ended");
                break;
            }
        }
    }
}

async fn handle_request(
    request: Request<()>,
    mut stream: H3Stream,
    peer: SocketAddr,
    dispatch: Dispatch,
) -> Result<(), h3::Error> {
    let path = request.uri().path().to_string();
    if let RouteMatch::Matched(route) = dispatch.table.match_request(request.method(), &path) {
        if route.kind == RouteKind::Upgrade {
            return respond(&mut stream, ApiError::upgrade_required(&path).into_response()).await;
        }
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = stream.recv_data().await? {
        if body.len() + chunk.remaining() > dispatch.max_body_size {
            return respond(&mut stream, ApiError::body_too_large().into_response()).await;
        }
        body.put(chunk);
    }

    let (parts, ()) = request.into_parts();
    let mut request = Request::from_parts(parts, Body::from(body.freeze()));
    request.extensions_mut().insert(ConnectInfo(peer));
    request.extensions_mut().insert(ListenerKind::Http3);

    let response = match dispatch.router.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    respond(&mut stream, response).await
}

async fn respond(stream: &mut H3Stream, response: axum::response::Response) -> Result<(), h3::Error> {
    let (parts, body) = response.into_parts();
    let (parts, bytes) = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => (parts, bytes),
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer HTTP/3 response body");
            let (parts, _) = ApiError::internal("failed to produce response").into_response().into_parts();
            (parts, Bytes::new())
        }
    };

    stream.send_response(Response::from_parts(parts, ())).await?;
    if !bytes.is_empty() {
        stream.send_data(bytes).await?;
    }
    stream.finish().await
}
