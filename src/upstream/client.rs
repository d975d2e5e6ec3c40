//! Generic "call + typed decode" helper over a shared, pooled HTTP client.
//!
//! # Responsibilities
//! - Build the process-wide HTTP client exactly once
//! - Serialize payloads, issue requests, classify failures
//! - Decode successful bodies into the caller's type
//!
//! # Design Decisions
//! - One pooled client per process, reused by every listener's handlers
//! - Status >= 300 is an upstream API error, never retried here
//! - No business validation: payloads arrive already validated

use bytes::Bytes;
use once_cell::sync::OnceCell;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::upstream::error::UpstreamError;

static SHARED_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();

/// Return the process-wide pooled client, building it on first use.
///
/// Concurrent first callers race on a single initialisation; the settings of
/// whichever caller wins are the ones used for the life of the process.
pub fn shared_http_client(config: &UpstreamConfig) -> Result<reqwest::Client, UpstreamError> {
    SHARED_CLIENT
        .get_or_try_init(|| {
            tracing::debug!(
                request_timeout_secs = config.request_timeout_secs,
                pool_max_idle_per_host = config.pool_max_idle_per_host,
                "Building shared upstream HTTP client"
            );
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .pool_max_idle_per_host(config.pool_max_idle_per_host)
                .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
                .min_tls_version(reqwest::tls::Version::TLS_1_2)
                .user_agent(concat!("agent-gateway/", env!("CARGO_PKG_VERSION")))
                .build()
        })
        .cloned()
        .map_err(UpstreamError::Client)
}

/// Thin handle over the shared client.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            http: shared_http_client(config)?,
        })
    }

    /// Issue one request and decode the response body into `T`.
    pub async fn call<T, P>(
        &self,
        method: Method,
        url: &str,
        payload: Option<&P>,
        headers: HeaderMap,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let body = self.send(method, url, payload, headers).await?;
        serde_json::from_slice(&body).map_err(|source| {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(url = %url, error = %source, body = %body, "Failed to decode upstream response");
            UpstreamError::Decode { source, body }
        })
    }

    /// `call` without a payload.
    pub async fn get<T>(&self, url: &str, headers: HeaderMap) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.call::<T, ()>(Method::GET, url, None, headers).await
    }

    /// Issue one request and return the raw body of a successful response.
    async fn send<P>(
        &self,
        method: Method,
        url: &str,
        payload: Option<&P>,
        headers: HeaderMap,
    ) -> Result<Bytes, UpstreamError>
    where
        P: Serialize + ?Sized,
    {
        let body = payload
            .map(serde_json::to_vec)
            .transpose()
            .map_err(UpstreamError::Serialize)?;

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = UpstreamError::from_send(e);
            tracing::error!(method = %method, url = %url, error = %err, "Upstream request failed");
            err
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(UpstreamError::from_send)?;

        if status.as_u16() >= 300 {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %body,
                "Upstream API error"
            );
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
