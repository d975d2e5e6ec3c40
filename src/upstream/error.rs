//! Upstream call error taxonomy.

use thiserror::Error;

/// Errors produced by [`UpstreamClient::call`](crate::upstream::UpstreamClient::call).
///
/// Local errors (`Serialize`, `InvalidRequest`) never reach the network.
/// `Timeout` and `Transport` mean no usable response arrived. `Api` is a
/// response with status >= 300. `Decode` is a successful response whose body
/// did not match the expected type.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Payload could not be encoded as JSON.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// URL or header could not be turned into a request.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),

    /// The overall request deadline elapsed.
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection refused, TLS failure, reset while reading, etc.
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream API error: status {status}")]
    Api { status: u16, body: String },

    /// The upstream answered successfully but the body did not decode.
    #[error("failed to decode upstream response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The shared HTTP client could not be built.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Short machine-readable label, also used as a metrics outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Serialize(_) => "serialize",
            UpstreamError::InvalidRequest(_) => "invalid_request",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Api { .. } => "api",
            UpstreamError::Decode { .. } => "decode",
            UpstreamError::Client(_) => "client",
        }
    }

    /// Status code returned by the upstream, if it answered.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else if err.is_builder() {
            UpstreamError::InvalidRequest(err.to_string())
        } else {
            UpstreamError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status_and_body() {
        let err = UpstreamError::Api {
            status: 422,
            body: r#"{"detail":"bad model"}"#.into(),
        };
        assert_eq!(err.kind(), "api");
        assert_eq!(err.upstream_status(), Some(422));
        assert_eq!(err.to_string(), "upstream API error: status 422");
    }

    #[test]
    fn decode_error_is_not_an_api_error() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = UpstreamError::Decode {
            source,
            body: "nope".into(),
        };
        assert_eq!(err.kind(), "decode");
        assert_eq!(err.upstream_status(), None);
    }
}
