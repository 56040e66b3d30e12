// src/github/types.rs
// =============================================================================
// Shapes of the JSON documents the API returns. Only the fields we use are
// declared; serde ignores the rest.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /repos/{owner}/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub size: u64,
    pub stargazers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub html_url: Option<String>,
}

/// One entry of `GET /repos/{owner}/{name}/branches`
#[derive(Debug, Clone, Deserialize)]
pub struct BranchInfo {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(default)]
    pub size: u64,
    pub sha: Option<String>,
    pub html_url: Option<String>,
}

/// The contents endpoint returns an array for a directory and a single
/// object for a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    Entries(Vec<ContentItem>),
    Single(ContentItem),
}

impl Listing {
    pub fn into_items(self) -> Vec<ContentItem> {
        match self {
            Listing::Entries(items) => items,
            Listing::Single(item) => vec![item],
        }
    }
}

/// `GET /repos/{owner}/{name}/contents/{file}`
#[derive(Debug, Clone, Deserialize)]
pub struct FileBody {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    pub encoding: Option<String>,
    pub content: Option<String>,
    pub html_url: Option<String>,
}

/// `GET /search/repositories`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchItem {
    pub full_name: String,
}
