// src/github/fetch.rs
// =============================================================================
// This module fetches data from the GitHub REST API.
//
// Strategy:
// - Every request goes through GithubClient::fetch
// - Transient failures (timeouts, 5xx, resets, any non-401 status) are
//   retried with exponential backoff: 2s, 4s, 8s... capped at 10s
// - Auth problems and undecodable bodies fail on the first attempt
//
// The typed helpers below (repository, contents, file, search) are the only
// endpoints the crawler needs.
// =============================================================================

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::transport::{RawResponse, Transport};
use super::types::{BranchInfo, ContentItem, FileBody, Listing, RepoInfo, SearchResponse};
use crate::config::{ApiConfig, RetryPolicy};
use crate::crawl::TreeId;
use crate::error::RequestError;

/// Authenticated, retrying API client. Cheap to share behind an Arc.
pub struct GithubClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
    search_page_size: u32,
}

impl GithubClient {
    pub fn new(transport: Arc<dyn Transport>, config: &ApiConfig) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            retry: config.retry,
            search_page_size: config.search_page_size,
        }
    }

    /// Absolute URL for an API path such as `/repos/a/b`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issues a GET and returns the successful response.
    ///
    /// Retries up to `max_attempts` times on retryable errors, sleeping
    /// between attempts. Non-retryable errors return immediately.
    pub async fn fetch(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<RawResponse, RequestError> {
        let token = self.token.as_deref().ok_or(RequestError::MissingToken)?;
        let mut attempt = 1;

        loop {
            match self.fetch_once(url, query, token).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    debug!(%url, attempt, ?delay, error = %e, "Retrying request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        url: &str,
        query: &[(String, String)],
        token: &str,
    ) -> Result<RawResponse, RequestError> {
        let response = self.transport.get(url, query, token).await?;

        match response.status {
            _ if response.is_success() => Ok(response),
            401 => Err(RequestError::Unauthorized { url: url.to_string() }),
            status => Err(RequestError::Status { url: url.to_string(), status }),
        }
    }

    /// GET and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, RequestError> {
        let response = self.fetch(url, query).await?;
        decode(url, &response.body)
    }

    pub async fn repository(&self, tree: &TreeId) -> Result<RepoInfo, RequestError> {
        let url = self.endpoint(&format!("/repos/{}", tree));
        self.get_json(&url, &[]).await
    }

    /// All branch names, across every page.
    pub async fn branches(&self, tree: &TreeId) -> Result<Vec<String>, RequestError> {
        let url = self.endpoint(&format!("/repos/{}/branches", tree));
        let branches: Vec<BranchInfo> = self.get_paginated(&url, Vec::new()).await?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    /// Directory listing at `path` ("" is the repository root).
    pub async fn contents(
        &self,
        tree: &TreeId,
        path: &str,
        branch: &str,
    ) -> Result<Vec<ContentItem>, RequestError> {
        let url = self.contents_url(tree, path)?;
        let listing: Listing = self.get_json(&url, &ref_param(branch)).await?;
        Ok(listing.into_items())
    }

    /// A single file, including its (usually base64) body.
    pub async fn file(
        &self,
        tree: &TreeId,
        path: &str,
        branch: &str,
    ) -> Result<FileBody, RequestError> {
        let url = self.contents_url(tree, path)?;
        self.get_json(&url, &ref_param(branch)).await
    }

    // Builds the contents URL for a repository path
    //
    // Each path segment is percent-encoded, so names like "a#b.md" or
    // "x?y" reach the API as part of the path.
    //
    // Example:
    //   ("octo/widgets", "docs/a#b.md")
    //   -> {base}/repos/octo/widgets/contents/docs/a%23b.md
    //   ("octo/widgets", "") -> {base}/repos/octo/widgets/contents/
    fn contents_url(&self, tree: &TreeId, path: &str) -> Result<String, RequestError> {
        let base = self.endpoint(&format!("/repos/{}/contents", tree));
        let invalid = |message: String| RequestError::Transport { url: base.clone(), message };

        let mut url = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot carry a path".to_string()))?
            .extend(path.split('/'));
        Ok(url.into())
    }

    /// Repository full names matching a search term (first page only).
    pub async fn search_repositories(&self, term: &str) -> Result<Vec<String>, RequestError> {
        let url = self.endpoint("/search/repositories");
        let query = vec![
            ("q".to_string(), term.to_string()),
            ("per_page".to_string(), self.search_page_size.to_string()),
        ];
        let response: SearchResponse = self.get_json(&url, &query).await?;
        Ok(response.items.into_iter().map(|i| i.full_name).collect())
    }
}

pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, RequestError> {
    serde_json::from_str(body).map_err(|e| RequestError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn ref_param(branch: &str) -> Vec<(String, String)> {
    vec![("ref".to_string(), branch.to_string())]
}
