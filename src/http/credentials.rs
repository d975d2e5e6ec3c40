//! Credential handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::models::CredentialPayload;
use crate::upstream::CredentialResponse;

/// `POST /v1/credentials`
pub async fn create_credential(
    State(state): State<AppState>,
    payload: Result<Json<CredentialPayload>, JsonRejection>,
) -> Result<Json<CredentialResponse>, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let response = state.agents.create_credential(&payload).await?;
    tracing::info!(credential_id = %response.credential_id, "Credential created");
    Ok(Json(response))
}
