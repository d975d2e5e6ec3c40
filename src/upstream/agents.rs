//! Typed agent-provider endpoints built on [`UpstreamClient`].

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use std::time::Instant;

use crate::config::{UpstreamAuth, UpstreamConfig};
use crate::models::{AgentPayload, CredentialPayload};
use crate::observability::metrics;
use crate::upstream::client::UpstreamClient;
use crate::upstream::error::UpstreamError;
use crate::upstream::types::{AgentResponse, CredentialResponse, ListAgentsBody, ListAgentsResponse};

pub const AGENTS_ENDPOINT: &str = "/v3/agents";
pub const CREDENTIALS_ENDPOINT: &str = "/v3/tools/credentials";

/// Agent-provider API: create/list agents, create credentials.
#[derive(Debug, Clone)]
pub struct AgentsApi {
    client: UpstreamClient,
    base_url: String,
    api_key: String,
    auth: UpstreamAuth,
}

impl AgentsApi {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: UpstreamClient::new(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            auth: config.auth,
        })
    }

    pub async fn create_agent(&self, payload: &AgentPayload) -> Result<AgentResponse, UpstreamError> {
        let url = self.url(AGENTS_ENDPOINT);
        let headers = self.auth_headers()?;
        observe("create_agent", self.client.call(Method::POST, &url, Some(payload), headers)).await
    }

    pub async fn list_agents(&self) -> Result<ListAgentsResponse, UpstreamError> {
        let url = self.url(AGENTS_ENDPOINT);
        let headers = self.auth_headers()?;
        observe("list_agents", self.client.get::<ListAgentsBody>(&url, headers))
            .await
            .map(ListAgentsResponse::from)
    }

    pub async fn create_credential(
        &self,
        payload: &CredentialPayload,
    ) -> Result<CredentialResponse, UpstreamError> {
        let url = self.url(CREDENTIALS_ENDPOINT);
        let headers = self.auth_headers()?;
        observe(
            "create_credential",
            self.client.call(Method::POST, &url, Some(payload), headers),
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<HeaderMap, UpstreamError> {
        let mut headers = HeaderMap::new();
        let (name, value) = match self.auth {
            UpstreamAuth::Bearer => (AUTHORIZATION, format!("Bearer {}", self.api_key)),
            UpstreamAuth::ApiKey => (HeaderName::from_static("x-api-key"), self.api_key.clone()),
        };
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| UpstreamError::InvalidRequest("API key is not a valid header value".into()))?;
        value.set_sensitive(true);
        headers.insert(name, value);
        Ok(headers)
    }
}

async fn observe<T, F>(endpoint: &'static str, call: F) -> Result<T, UpstreamError>
where
    F: std::future::Future<Output = Result<T, UpstreamError>>,
{
    let started = Instant::now();
    let result = call.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::record_upstream_call(endpoint, outcome, started);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(auth: UpstreamAuth) -> AgentsApi {
        let config = UpstreamConfig {
            base_url: "https://provider.example/".into(),
            api_key: "k-123".into(),
            auth,
            ..Default::default()
        };
        AgentsApi::new(&config).unwrap()
    }

    #[test]
    fn urls_join_without_double_slash() {
        assert_eq!(api(UpstreamAuth::Bearer).url(AGENTS_ENDPOINT), "https://provider.example/v3/agents");
    }

    #[test]
    fn bearer_and_api_key_headers() {
        let bearer = api(UpstreamAuth::Bearer).auth_headers().unwrap();
        assert_eq!(bearer[AUTHORIZATION], "Bearer k-123");
        assert!(bearer.get("x-api-key").is_none());

        let key = api(UpstreamAuth::ApiKey).auth_headers().unwrap();
        assert_eq!(key["x-api-key"], "k-123");
        assert!(key.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn api_key_with_newline_is_rejected_locally() {
        let mut api = api(UpstreamAuth::ApiKey);
        api.api_key = "bad\nkey".into();
        assert!(matches!(api.auth_headers(), Err(UpstreamError::InvalidRequest(_))));
    }
}
