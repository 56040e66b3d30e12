// src/error.rs
// =============================================================================
// Error types for the fetcher and for crawl sessions.
//
// Two layers:
// - RequestError: one HTTP call failed (after or without retries)
// - CrawlError: a whole crawl session was aborted
//
// Node-level failures (one directory, one file) never become a CrawlError.
// The traverser logs them and keeps going.
// =============================================================================

use thiserror::Error;

/// A single API request failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No token was configured, so the request was never sent
    #[error("No API token configured (set --token or GITHUB_TOKEN)")]
    MissingToken,

    /// The server rejected our credentials
    #[error("Authorization failed for {url}")]
    Unauthorized { url: String },

    /// Any other non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Connection reset, timeout, DNS, TLS...
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The body was not the JSON we expected
    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl RequestError {
    /// Whether the fetcher should try this request again.
    ///
    /// Every HTTP or transport failure is retried except bad credentials.
    /// A body we cannot decode will not decode any better next time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RequestError::Status { .. } | RequestError::Transport { .. })
    }
}

/// A crawl session could not run to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    /// The session was started without a repository name
    #[error("Repository name must be specified")]
    MissingTree,

    /// The identifier is not of the form owner/name
    #[error("Invalid repository identifier '{0}': expected owner/name")]
    InvalidTreeId(String),

    /// A pinned branch does not exist in the repository
    #[error(
        "Branch '{branch}' not found in repository '{repo}'. Available branches: {}",
        .available.join(", ")
    )]
    BranchNotFound {
        branch: String,
        repo: String,
        available: Vec<String>,
    },

    /// Fetching repository metadata or the branch list failed
    #[error(transparent)]
    Request(#[from] RequestError),
}
