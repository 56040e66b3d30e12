// src/config.rs
// =============================================================================
// Configuration for talking to the API and for a single crawl session.
//
// ApiConfig can come from an optional TOML file; command-line flags win over
// the file. CrawlConfig is built per repository and handed to the session by
// value.
//
// Example crawler.toml:
//
//   base_url = "https://api.github.com"
//   timeout_secs = 30
//   max_concurrent_dirs = 10
//
//   [retry]
//   max_attempts = 3
//   initial_backoff_secs = 2
//   max_backoff_secs = 10
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::crawl::TreeId;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// How the fetcher retries transient failures.
///
/// Delays start at `initial_backoff`, double after every failed attempt and
/// never exceed `max_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Settings shared by every request and every crawl session.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub max_concurrent_dirs: usize,
    pub search_page_size: u32,
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            max_concurrent_dirs: 10,
            search_page_size: 10,
            retry: RetryPolicy::default(),
        }
    }
}

/// Everything needed to crawl one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    pub tree: TreeId,
    /// Pinned branch; `None` means the repository's default branch
    pub branch: Option<String>,
}

impl CrawlConfig {
    pub fn new(tree: TreeId) -> Self {
        Self { tree, branch: None }
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch.filter(|b| !b.trim().is_empty());
        self
    }
}

// On-disk shape of the config file. Every field is optional so a file can
// override just one setting.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
    max_concurrent_dirs: Option<usize>,
    search_page_size: Option<u32>,
    #[serde(default)]
    retry: FileRetryConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileRetryConfig {
    max_attempts: Option<u32>,
    initial_backoff_secs: Option<u64>,
    max_backoff_secs: Option<u64>,
}

/// Reads and validates a TOML config file.
pub fn load_config(path: &Path) -> Result<ApiConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<ApiConfig> {
    let file: FileConfig = toml::from_str(content).context("Failed to parse config file")?;
    let defaults = ApiConfig::default();

    let retry = RetryPolicy {
        max_attempts: file.retry.max_attempts.unwrap_or(defaults.retry.max_attempts),
        initial_backoff: file
            .retry
            .initial_backoff_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry.initial_backoff),
        max_backoff: file
            .retry
            .max_backoff_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.retry.max_backoff),
    };

    let config = ApiConfig {
        base_url: file.base_url.unwrap_or(defaults.base_url),
        token: file.token.or(defaults.token),
        timeout: file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
        max_concurrent_dirs: file.max_concurrent_dirs.unwrap_or(defaults.max_concurrent_dirs),
        search_page_size: file.search_page_size.unwrap_or(defaults.search_page_size),
        retry,
    };

    validate(&config)?;
    Ok(config)
}

/// Checks the invariants the crawler relies on.
pub fn validate(config: &ApiConfig) -> Result<()> {
    Url::parse(&config.base_url)
        .with_context(|| format!("Invalid base_url '{}'", config.base_url))?;

    if config.retry.max_attempts == 0 {
        bail!("retry.max_attempts must be >= 1");
    }
    if config.retry.initial_backoff > config.retry.max_backoff {
        bail!("retry.initial_backoff_secs must not exceed retry.max_backoff_secs");
    }
    if config.max_concurrent_dirs == 0 {
        bail!("max_concurrent_dirs must be >= 1");
    }
    if !(1..=100).contains(&config.search_page_size) {
        bail!("search_page_size must be in 1..=100");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(4), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent_dirs, 10);
        assert_eq!(config.search_page_size, 10);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config(
            r#"
            max_concurrent_dirs = 4

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.max_concurrent_dirs, 4);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_secs(2));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_config("max_concurrent_dirs = 0").is_err());
        assert!(parse_config("base_url = \"not a url\"").is_err());
        assert!(parse_config("[retry]\nmax_attempts = 0").is_err());
        assert!(parse_config("search_page_size = 500").is_err());
        assert!(parse_config("unknown_key = 1").is_err());
    }

    #[test]
    fn test_blank_branch_means_default() {
        let tree = TreeId::parse("octo/widgets").unwrap();
        let config = CrawlConfig::new(tree).with_branch(Some("  ".into()));
        assert_eq!(config.branch, None);
    }
}
