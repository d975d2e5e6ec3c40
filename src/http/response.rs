//! JSON error responses.
//!
//! # Responsibilities
//! - Map validation, routing, and upstream failures to HTTP status codes
//! - Render every error as `{"error": ..., "kind": ...}` plus optional context
//!
//! # Design Decisions
//! - Every upstream failure is a 500; the upstream status is reported in the
//!   body, never passed through as our own status
//! - Validation errors list every failing constraint in `details`

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::models::ValidationErrors;
use crate::upstream::UpstreamError;

/// Error returned by every HTTP handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
    details: Option<Value>,
    upstream_status: Option<u16>,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            details: None,
            upstream_status: None,
        }
    }

    /// Body could not be parsed as the expected JSON shape.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }

    /// Body exceeded the configured size limit.
    pub fn body_too_large() -> Self {
        Self::invalid_input("request body too large")
    }

    pub fn validation(errors: &ValidationErrors) -> Self {
        let details = errors.errors().iter().map(|e| Value::String(e.to_string())).collect();
        Self {
            details: Some(Value::Array(details)),
            ..Self::new(StatusCode::BAD_REQUEST, "validation", format!("Validation failed: {errors}"))
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", format!("no route for {path}"))
    }

    pub fn method_not_allowed(method: &str, path: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            format!("{method} is not allowed on {path}"),
        )
    }

    /// The route only works after a protocol upgrade this transport cannot perform.
    pub fn upgrade_required(path: &str) -> Self {
        Self::new(
            StatusCode::UPGRADE_REQUIRED,
            "upgrade_required",
            format!("{path} requires a WebSocket upgrade over HTTP/1.1 or a WebTransport session"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        match err {
            UpstreamError::Api { status: upstream, body } => Self {
                details: Some(serde_json::from_str(&body).unwrap_or(Value::String(body))),
                upstream_status: Some(upstream),
                ..Self::new(status, "upstream", format!("upstream returned status {upstream}"))
            },
            UpstreamError::Timeout(_) => Self::new(status, "upstream_timeout", err.to_string()),
            UpstreamError::Decode { ref body, .. } => Self {
                details: Some(Value::String(body.clone())),
                ..Self::new(status, "upstream_decode", err.to_string())
            },
            other => Self::new(status, "upstream", other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::body_too_large();
        }
        Self::invalid_input(format!("Invalid JSON: {}", rejection.body_text()))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(&errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), kind = self.kind, error = %self.message, "Request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), kind = self.kind, error = %self.message, "Request rejected");
        }

        let mut body = json!({
            "error": self.message,
            "kind": self.kind,
        });
        if let Some(upstream) = self.upstream_status {
            body["upstream_status"] = json!(upstream);
        }
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    async fn body_json(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_lists_every_failure() {
        let errors = ValidationErrors(vec![
            ValidationError::Required("model"),
            ValidationError::Required("provider_id"),
        ]);
        let (status, body) = body_json(ApiError::validation(&errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["error"], "Validation failed: model is required, provider_id is required");
        assert_eq!(body["details"], json!(["model is required", "provider_id is required"]));
    }

    #[tokio::test]
    async fn upstream_api_error_is_500_with_upstream_status() {
        let err = UpstreamError::Api {
            status: 422,
            body: r#"{"detail":"bad"}"#.into(),
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "upstream");
        assert_eq!(body["upstream_status"], 422);
        assert_eq!(body["details"]["detail"], "bad");
    }

    #[tokio::test]
    async fn non_json_upstream_body_is_kept_as_text() {
        let err = UpstreamError::Api {
            status: 502,
            body: "Bad Gateway".into(),
        };
        let (_, body) = body_json(err.into()).await;
        assert_eq!(body["details"], "Bad Gateway");
    }

    #[tokio::test]
    async fn decode_error_has_its_own_kind() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = UpstreamError::Decode {
            source,
            body: "<html>".into(),
        };
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "upstream_decode");
        assert_eq!(body["details"], "<html>");
    }

    #[tokio::test]
    async fn routing_errors() {
        let (status, body) = body_json(ApiError::not_found("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no route for /nope");

        let (status, body) = body_json(ApiError::upgrade_required("/v1/agents/chat")).await;
        assert_eq!(status, StatusCode::UPGRADE_REQUIRED);
        assert_eq!(body["kind"], "upgrade_required");
    }
}
