//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use rustls::pki_types::CertificateDer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use agent_gateway::config::{GatewayConfig, TlsConfig};
use agent_gateway::http::{serve_plain, AppState};
use agent_gateway::lifecycle::Shutdown;
use agent_gateway::routing::{build_router, RouteTable};

/// How the mock upstream answers every request.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// 200 with a plausible provider body.
    Ok,
    /// Fixed status and raw body.
    Status(u16, &'static str),
    /// 200 with a body that is not JSON.
    Garbage,
    /// Sleep before answering 200.
    Slow(Duration),
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    last_auth: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

/// Handle to a running mock agent provider.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    last_auth: Arc<Mutex<Option<String>>>,
    last_body: Arc<Mutex<Option<Value>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }
}

/// Start a mock provider on an ephemeral port.
pub async fn start_mock_upstream(behavior: Behavior) -> MockUpstream {
    let state = MockState {
        behavior,
        calls: Arc::new(AtomicUsize::new(0)),
        last_auth: Arc::new(Mutex::new(None)),
        last_body: Arc::new(Mutex::new(None)),
    };

    let app = Router::new()
        .route("/v3/agents", post(create_agent).get(list_agents))
        .route("/v3/tools/credentials", post(create_credential))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        addr,
        calls: state.calls,
        last_auth: state.last_auth,
        last_body: state.last_body,
    }
}

async fn record(state: &MockState, headers: &HeaderMap, body: Option<Value>) -> Option<Response> {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_body.lock().unwrap() = body;

    match &state.behavior {
        Behavior::Ok => None,
        Behavior::Status(status, body) => Some(
            (StatusCode::from_u16(*status).unwrap(), body.to_string()).into_response(),
        ),
        Behavior::Garbage => Some((StatusCode::OK, "<html>not json</html>").into_response()),
        Behavior::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            None
        }
    }
}

async fn create_agent(State(state): State<MockState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Some(response) = record(&state, &headers, Some(body.clone())).await {
        return response;
    }
    Json(json!({
        "agent_id": "agent-123",
        "name": body["name"],
        "status": "created",
    }))
    .into_response()
}

async fn list_agents(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Some(response) = record(&state, &headers, None).await {
        return response;
    }
    Json(json!([
        {"_id": "a1", "name": "first", "features": null, "tools": null},
        {"_id": "a2", "name": "second", "temperature": 0.3}
    ]))
    .into_response()
}

async fn create_credential(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = record(&state, &headers, Some(body)).await {
        return response;
    }
    Json(json!({"credential_id": "cred-9", "provider_id": "openai"})).into_response()
}

/// Gateway configuration pointing at `base_url`.
pub fn gateway_config(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.upstream.api_key = "test-key".to_string();
    config.upstream.request_timeout_secs = 1;
    config.upstream.connect_timeout_secs = 1;
    config
}

/// A gateway plain-HTTP listener running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Arc<Shutdown>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/v1/agents/chat", self.addr)
    }
}

pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let shutdown = Arc::new(Shutdown::new());
    let state = AppState::new(&config, Arc::clone(&shutdown)).unwrap();
    let router = build_router(&RouteTable::standard(), state.clone(), &config.security);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_plain(listener, router, Arc::clone(&shutdown)));

    TestGateway { addr, state, shutdown }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// A valid create-agent body.
pub fn agent_body() -> Value {
    json!({
        "name": "support-bot",
        "system_prompt": "You help customers.",
        "description": "Tier one support",
        "features": [{"type": "memory", "config": {}, "priority": 0}],
        "tools": [],
        "llm_credential_id": "cred-1",
        "provider_id": "openai",
        "model": "gpt-4o-mini",
        "top_p": 0.9,
        "temperature": 0.7,
        "response_format": {"type": "text"}
    })
}

/// A self-signed certificate for `localhost` and `127.0.0.1`, written as a
/// PEM pair into its own temp directory. The directory goes away on drop.
pub struct TestCert {
    pub tls: TlsConfig,
    pub der: CertificateDer<'static>,
    dir: PathBuf,
}

impl Drop for TestCert {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub fn self_signed_cert() -> TestCert {
    let rcgen::CertifiedKey { cert, key_pair } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()]).unwrap();

    let dir = std::env::temp_dir().join(format!("agent-gateway-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let cert_path = dir.join("cert.pem");
    let key_path = dir.join("key.pem");
    std::fs::write(&cert_path, cert.pem()).unwrap();
    std::fs::write(&key_path, key_pair.serialize_pem()).unwrap();

    TestCert {
        tls: TlsConfig {
            cert_path: cert_path.display().to_string(),
            key_path: key_path.display().to_string(),
        },
        der: cert.der().clone(),
        dir,
    }
}

/// Client TLS trusting only `cert`, speaking HTTP/3.
pub fn h3_client_tls(cert: &TestCert) -> rustls::ClientConfig {
    let mut roots = rustls::RootCertStore::empty();
    roots.add(cert.der.clone()).unwrap();

    let mut tls = rustls::ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_protocol_versions(&[&rustls::version::TLS13])
        .unwrap()
        .with_root_certificates(roots)
        .with_no_client_auth();
    tls.alpn_protocols = vec![b"h3".to_vec()];
    tls
}
