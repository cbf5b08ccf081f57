// HTTP client for the AgroTrade API
//
// Wraps a pooled reqwest client with the base URL, JSON content
// negotiation, and a bounded timeout. Every outgoing request picks up
// the stored bearer token; every 401 response evicts it.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::RequestError;
use crate::store::CredentialStore;

pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Base URL without a trailing slash
    base_url: String,

    /// Bearer token storage
    store: Arc<dyn CredentialStore>,

    /// Timeout for the reachability probe
    ping_timeout: Duration,
}

impl ApiClient {
    /// Create a new API client from configuration.
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.http_connect_timeout))
            .timeout(Duration::from_secs(config.http_request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
            ping_timeout: Duration::from_secs(config.ping_timeout),
        })
    }

    /// Send a GET request to `path` (relative to the base URL).
    pub async fn get(&self, path: &str) -> Result<Value, RequestError> {
        let builder = self.client.get(self.url(path));
        self.dispatch(builder).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Value, RequestError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.client.post(self.url(path)).json(body);
        self.dispatch(builder).await
    }

    /// Check whether the API is reachable. Bounded by the ping timeout;
    /// any failure means unreachable.
    pub async fn check_connection(&self) -> bool {
        let builder = self
            .client
            .get(self.url("/debug/ping"))
            .timeout(self.ping_timeout);

        match self.authorize(builder).await.send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the stored bearer token, if any. A storage failure must not
    /// block the request; it proceeds unauthenticated.
    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.read().await {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                builder
            }
        }
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Value, RequestError> {
        let builder = self.authorize(builder).await;

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();

        tracing::debug!(status = %status, "Received HTTP response");

        if status.is_success() {
            let text = response.text().await.map_err(map_transport_error)?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text)
                .map_err(|e| RequestError::Transport(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            // Stale or revoked token: purge it so the next attempt starts
            // clean instead of retrying a rejected credential. The
            // eviction's own failure never replaces the primary error.
            if let Err(e) = self.store.clear().await {
                tracing::warn!("Failed to evict token after 401: {}", e);
            } else {
                tracing::debug!("Evicted stored token after 401 response");
            }
        }

        tracing::warn!(
            status = status.as_u16(),
            body = %body,
            "HTTP request failed with error response"
        );

        Err(RequestError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

/// Map a reqwest error into the closed failure taxonomy.
fn map_transport_error(e: reqwest::Error) -> RequestError {
    if e.is_timeout() {
        RequestError::Timeout
    } else if e.is_connect() {
        RequestError::NetworkUnreachable
    } else {
        RequestError::Transport(e.to_string())
    }
}
