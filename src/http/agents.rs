//! Agent CRUD handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::models::AgentPayload;
use crate::upstream::{AgentResponse, ListAgentsResponse};

/// `POST /v1/agents`: validate locally, then forward to the provider.
///
/// Invalid JSON and validation failures never reach the upstream.
pub async fn create_agent(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AgentPayload>, JsonRejection>,
) -> Result<Json<AgentResponse>, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    tracing::debug!(
        request_id = headers.request_id().unwrap_or("-"),
        name = payload.name.as_deref().unwrap_or_default(),
        "Creating agent"
    );
    let response = state.agents.create_agent(&payload).await?;
    Ok(Json(response))
}

/// `GET /v1/agents`
pub async fn list_agents(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListAgentsResponse>, ApiError> {
    let response = state.agents.list_agents().await?;
    tracing::debug!(
        request_id = headers.request_id().unwrap_or("-"),
        count = response.agents.len(),
        "Listed agents"
    );
    Ok(Json(response))
}
