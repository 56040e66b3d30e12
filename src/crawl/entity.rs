// src/crawl/entity.rs
// =============================================================================
// The values a crawl produces.
//
// Every entity carries the breadcrumbs of its ancestors, from the repository
// down to its direct parent. Breadcrumb lists are owned by each node and
// cloned on the way down, so sibling subtrees never share one.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::error::CrawlError;
use crate::github::types::{ContentItem, FileBody, RepoInfo};

/// `owner/name` identifier of one crawlable repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TreeId(String);

impl TreeId {
    /// Parses `owner/name`, rejecting anything with a missing half or
    /// extra segments.
    pub fn parse(s: &str) -> Result<Self, CrawlError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CrawlError::MissingTree);
        }
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self(s.to_string()))
            }
            _ => Err(CrawlError::InvalidTreeId(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, name)| name)
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Repository,
    Directory,
    File,
}

/// One ancestor on the path from the repository root to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub entity_id: String,
    pub name: String,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepositoryEntity {
    pub entity_id: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub language: Option<String>,
    pub fork: bool,
    pub size: u64,
    pub stars_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub url: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntity {
    pub entity_id: String,
    pub path: String,
    pub repo_name: String,
    pub repo_owner: String,
    pub content: String,
    pub url: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileEntity {
    pub entity_id: String,
    pub file_id: String,
    pub name: String,
    pub path: String,
    pub repo_name: String,
    pub repo_owner: String,
    pub sha: String,
    pub size: u64,
    pub language: String,
    pub mime_type: String,
    pub line_count: usize,
    pub content: Option<String>,
    pub url: Option<String>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// Anything a crawl session emits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Repository(RepositoryEntity),
    Directory(DirectoryEntity),
    File(FileEntity),
}

impl Entity {
    pub fn entity_id(&self) -> &str {
        match self {
            Entity::Repository(e) => &e.entity_id,
            Entity::Directory(e) => &e.entity_id,
            Entity::File(e) => &e.entity_id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Repository(_) => EntityKind::Repository,
            Entity::Directory(_) => EntityKind::Directory,
            Entity::File(_) => EntityKind::File,
        }
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        match self {
            Entity::Repository(e) => &e.breadcrumbs,
            Entity::Directory(e) => &e.breadcrumbs,
            Entity::File(e) => &e.breadcrumbs,
        }
    }

    /// Path inside the repository, or the full name for the repository itself.
    pub fn label(&self) -> &str {
        match self {
            Entity::Repository(e) => &e.full_name,
            Entity::Directory(e) => &e.path,
            Entity::File(e) => &e.path,
        }
    }

    /// Breadcrumb pointing at this entity, for its children.
    pub fn as_breadcrumb(&self) -> Breadcrumb {
        let name = match self {
            Entity::Repository(e) => e.name.clone(),
            Entity::Directory(e) => last_segment(&e.path).to_string(),
            Entity::File(e) => e.name.clone(),
        };
        Breadcrumb {
            entity_id: self.entity_id().to_string(),
            name,
            kind: self.kind(),
        }
    }
}

/// Stable id of a node: `{tree}/{path}`.
pub fn node_id(tree: &TreeId, path: &str) -> String {
    format!("{}/{}", tree, path)
}

/// MIME type guessed from the file name, `text/plain` when unknown.
pub fn mime_type_of(path: &str) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("text/plain")
        .to_string()
}

pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn repository_entity(info: RepoInfo) -> Entity {
    Entity::Repository(RepositoryEntity {
        entity_id: info.id.to_string(),
        name: info.name,
        full_name: info.full_name,
        description: info.description,
        default_branch: info.default_branch,
        created_at: info.created_at,
        updated_at: info.updated_at,
        language: info.language,
        fork: info.fork,
        size: info.size,
        stars_count: info.stargazers_count,
        watchers_count: info.watchers_count,
        forks_count: info.forks_count,
        open_issues_count: info.open_issues_count,
        url: info.html_url,
        breadcrumbs: Vec::new(),
    })
}

pub fn directory_entity(tree: &TreeId, item: &ContentItem, breadcrumbs: Vec<Breadcrumb>) -> Entity {
    Entity::Directory(DirectoryEntity {
        entity_id: node_id(tree, &item.path),
        path: item.path.clone(),
        repo_name: tree.name().to_string(),
        repo_owner: tree.owner().to_string(),
        content: format!("Directory: {}", item.path),
        url: item.html_url.clone(),
        breadcrumbs,
    })
}

/// Fields the traverser works out for a text file.
pub struct FileDetails {
    pub language: String,
    pub line_count: usize,
    pub content: Option<String>,
}

pub fn file_entity(
    tree: &TreeId,
    path: &str,
    body: FileBody,
    details: FileDetails,
    breadcrumbs: Vec<Breadcrumb>,
) -> Entity {
    Entity::File(FileEntity {
        entity_id: node_id(tree, path),
        file_id: body.sha.clone(),
        name: last_segment(path).to_string(),
        path: path.to_string(),
        repo_name: tree.name().to_string(),
        repo_owner: tree.owner().to_string(),
        sha: body.sha,
        size: body.size,
        language: details.language,
        mime_type: mime_type_of(path),
        line_count: details.line_count,
        content: details.content,
        url: body.html_url,
        breadcrumbs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_id_parts() {
        let tree = TreeId::parse(" octo/widgets ").unwrap();
        assert_eq!(tree.as_str(), "octo/widgets");
        assert_eq!(tree.owner(), "octo");
        assert_eq!(tree.name(), "widgets");
    }

    #[test]
    fn test_tree_id_rejects_bad_input() {
        assert_eq!(TreeId::parse(""), Err(CrawlError::MissingTree));
        assert!(matches!(TreeId::parse("octo"), Err(CrawlError::InvalidTreeId(_))));
        assert!(matches!(TreeId::parse("/widgets"), Err(CrawlError::InvalidTreeId(_))));
        assert!(matches!(TreeId::parse("a/b/c"), Err(CrawlError::InvalidTreeId(_))));
    }

    #[test]
    fn test_directory_ids_are_deterministic() {
        let tree = TreeId::parse("octo/widgets").unwrap();
        let item: ContentItem = serde_json::from_value(crate::testing::dir_entry("docs/api")).unwrap();

        let first = directory_entity(&tree, &item, Vec::new());
        let second = directory_entity(&tree, &item, Vec::new());
        assert_eq!(first.entity_id(), "octo/widgets/docs/api");
        assert_eq!(first.entity_id(), second.entity_id());

        let crumb = first.as_breadcrumb();
        assert_eq!(crumb.name, "api");
        assert_eq!(crumb.kind, EntityKind::Directory);
    }

    #[test]
    fn test_mime_type_falls_back_to_plain_text() {
        assert_eq!(mime_type_of("package.json"), "application/json");
        assert_eq!(mime_type_of("docs/index.html"), "text/html");
        assert_eq!(mime_type_of("LICENSE"), "text/plain");
        assert_eq!(mime_type_of("build.unknownext"), "text/plain");
    }

    #[test]
    fn test_entity_json_is_tagged() {
        let tree = TreeId::parse("octo/widgets").unwrap();
        let item: ContentItem = serde_json::from_value(crate::testing::dir_entry("docs")).unwrap();
        let value = serde_json::to_value(directory_entity(&tree, &item, Vec::new())).unwrap();
        assert_eq!(value["kind"], "directory");
        assert_eq!(value["path"], "docs");
    }
}
