// src/github/transport.rs
// =============================================================================
// The one place that actually touches the network.
//
// Transport is a small trait so the fetcher, paginator and traverser can be
// driven by an in-memory fake in tests. HttpTransport is the real thing,
// built on reqwest.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::RequestError;

/// What came back from one GET, before any status handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Value of the `Link` header, if any
    pub link: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single authenticated GET request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        token: &str,
    ) -> Result<RawResponse, RequestError>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repo-crawler/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        token: &str,
    ) -> Result<RawResponse, RequestError> {
        let transport_error = |e: reqwest::Error| RequestError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("token {}", token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let link = response
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(transport_error)?;

        Ok(RawResponse { status, link, body })
    }
}
