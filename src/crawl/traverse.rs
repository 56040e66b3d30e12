// src/crawl/traverse.rs
// =============================================================================
// Walks one repository and streams its entities.
//
// How a crawl session runs:
// 1. Fetch repository metadata (once) and resolve the branch
//    - a pinned branch must exist in the branch list, or the session fails
//    - otherwise the repository's default branch is used as-is
// 2. Emit the repository entity first, with no breadcrumbs
// 3. Walk the root directory ("")
//
// How one directory is walked:
// 1. Skip it if its path was already visited (check + insert under one lock)
// 2. Take a permit (at most max_concurrent_dirs directories work at once)
// 3. Emit its DirectoryEntity, fetch its listing
// 4. Process its files one after another
// 5. Release the permit, then walk all subdirectories concurrently
//
// Files of a directory are therefore always emitted before anything from its
// subdirectories. Sibling subtrees interleave in completion order.
//
// A failed listing abandons that subtree only; a failed file skips that file
// only. Both are logged and the rest of the crawl carries on.
// =============================================================================

use base64::Engine;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::emitter::{channel, Emitter, EntityStream};
use super::entity::{
    directory_entity, file_entity, repository_entity, Breadcrumb, FileDetails, TreeId,
};
use crate::classify::{
    extension_of, DefaultTextClassifier, ExtensionLanguages, LanguageDetector, TextClassifier,
};
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::github::types::{ContentItem, ContentKind, FileBody, RepoInfo};
use crate::github::GithubClient;

pub const DEFAULT_MAX_CONCURRENT_DIRS: usize = 10;

/// Starts crawl sessions. Holds the client and the content collaborators.
#[derive(Clone)]
pub struct TreeTraverser {
    client: Arc<GithubClient>,
    classifier: Arc<dyn TextClassifier>,
    languages: Arc<dyn LanguageDetector>,
    max_concurrent_dirs: usize,
}

impl TreeTraverser {
    pub fn new(client: Arc<GithubClient>, max_concurrent_dirs: usize) -> Self {
        Self {
            client,
            classifier: Arc::new(DefaultTextClassifier),
            languages: Arc::new(ExtensionLanguages),
            max_concurrent_dirs: max_concurrent_dirs.max(1),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn TextClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_language_detector(mut self, languages: Arc<dyn LanguageDetector>) -> Self {
        self.languages = languages;
        self
    }

    /// Starts crawling in the background and returns the entity stream.
    ///
    /// A fatal session error (unknown branch, metadata fetch failure) arrives
    /// as a single `Err` item, after which the stream ends.
    pub fn crawl(&self, config: CrawlConfig) -> EntityStream {
        let (emitter, stream) = channel();
        tokio::spawn(run_session(self.clone(), config, emitter));
        stream
    }
}

/// Counters for one session, logged when it finishes.
#[derive(Debug, Default)]
pub struct SessionStats {
    pub directories: AtomicU64,
    pub files: AtomicU64,
    pub skipped_binary: AtomicU64,
    pub failed_directories: AtomicU64,
    pub failed_files: AtomicU64,
}

impl SessionStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

async fn run_session(traverser: TreeTraverser, config: CrawlConfig, emitter: Emitter) {
    let tree = config.tree.clone();
    info!(repo = %tree, "Starting crawl");

    let (info, branch) = match prepare(&traverser.client, &config).await {
        Ok(prepared) => prepared,
        Err(e) => {
            warn!(repo = %tree, error = %e, "Crawl aborted");
            emitter.fail(e).await;
            return;
        }
    };
    info!(repo = %tree, %branch, "Using branch");

    let repo = repository_entity(info);
    let root_crumbs = vec![repo.as_breadcrumb()];
    if !emitter.emit(repo).await {
        return;
    }

    let session = Arc::new(Session {
        client: traverser.client,
        classifier: traverser.classifier,
        languages: traverser.languages,
        tree,
        branch,
        visited: Mutex::new(HashSet::new()),
        permits: Semaphore::new(traverser.max_concurrent_dirs),
        emitter,
        stats: SessionStats::default(),
    });

    Arc::clone(&session).walk(None, root_crumbs).await;

    let stats = &session.stats;
    info!(
        repo = %session.tree,
        directories = stats.directories.load(Ordering::Relaxed),
        files = stats.files.load(Ordering::Relaxed),
        skipped_binary = stats.skipped_binary.load(Ordering::Relaxed),
        failed_directories = stats.failed_directories.load(Ordering::Relaxed),
        failed_files = stats.failed_files.load(Ordering::Relaxed),
        "Crawl finished"
    );
}

/// Fetches repository metadata and settles on the branch to crawl.
async fn prepare(
    client: &GithubClient,
    config: &CrawlConfig,
) -> Result<(RepoInfo, String), CrawlError> {
    let info = client.repository(&config.tree).await?;

    let branch = match &config.branch {
        Some(pinned) => {
            let available = client.branches(&config.tree).await?;
            if !available.iter().any(|b| b == pinned) {
                return Err(CrawlError::BranchNotFound {
                    branch: pinned.clone(),
                    repo: config.tree.to_string(),
                    available,
                });
            }
            pinned.clone()
        }
        None => info.default_branch.clone(),
    };

    Ok((info, branch))
}

/// State shared by every directory task of one crawl session.
struct Session {
    client: Arc<GithubClient>,
    classifier: Arc<dyn TextClassifier>,
    languages: Arc<dyn LanguageDetector>,
    tree: TreeId,
    branch: String,
    visited: Mutex<HashSet<String>>,
    permits: Semaphore,
    emitter: Emitter,
    stats: SessionStats,
}

type Children = Vec<(ContentItem, Vec<Breadcrumb>)>;

impl Session {
    /// Returns true if `path` had not been visited yet.
    fn mark_visited(&self, path: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string())
    }

    // Walks a directory and everything below it
    //
    // Parameters:
    //   dir: The listing entry of the directory, None for the repository root
    //   breadcrumbs: Ancestors of the directory, repository first
    //
    // Returns: a boxed future, so the walk can recurse into itself
    //
    // Example:
    //   root lists [README.md, src/, docs/]
    //   -> README.md is emitted while the root holds its permit
    //   -> the permit is released, then src/ and docs/ are walked together
    fn walk(
        self: Arc<Self>,
        dir: Option<ContentItem>,
        breadcrumbs: Vec<Breadcrumb>,
    ) -> BoxFuture<'static, ()> {
        async move {
            if self.emitter.is_closed() {
                return;
            }
            let path = dir.as_ref().map_or("", |d| d.path.as_str()).to_string();
            if !self.mark_visited(&path) {
                debug!(%path, "Already visited");
                return;
            }

            let children = {
                let Ok(_permit) = self.permits.acquire().await else {
                    return;
                };
                match self.visit(dir.as_ref(), &path, breadcrumbs).await {
                    Some(children) => children,
                    None => return,
                }
            };

            let tasks = children
                .into_iter()
                .map(|(item, crumbs)| Arc::clone(&self).walk(Some(item), crumbs));
            join_all(tasks).await;
        }
        .boxed()
    }

    // Does the permit-holding part of a directory visit
    //
    // Parameters:
    //   dir: The directory entry (None for the root, which emits no entity)
    //   path: Repository path of the directory ("" for the root)
    //   breadcrumbs: Ancestors of the directory
    //
    // Returns: the subdirectories to walk next, each with its breadcrumbs,
    // or None when the listing failed or the consumer has gone away
    async fn visit(
        &self,
        dir: Option<&ContentItem>,
        path: &str,
        breadcrumbs: Vec<Breadcrumb>,
    ) -> Option<Children> {
        let crumbs = match dir {
            Some(item) => {
                let entity = directory_entity(&self.tree, item, breadcrumbs.clone());
                let crumb = entity.as_breadcrumb();
                if !self.emitter.emit(entity).await {
                    return None;
                }
                SessionStats::bump(&self.stats.directories);

                let mut crumbs = breadcrumbs;
                crumbs.push(crumb);
                crumbs
            }
            None => breadcrumbs,
        };

        let items = match self.client.contents(&self.tree, path, &self.branch).await {
            Ok(items) => items,
            Err(e) => {
                warn!(repo = %self.tree, %path, error = %e, "Error traversing path, skipping subtree");
                SessionStats::bump(&self.stats.failed_directories);
                return None;
            }
        };

        let mut dirs = Vec::new();
        for item in items {
            match item.kind {
                ContentKind::File => {
                    // a listing can repeat an entry; emit each file once
                    if !self.mark_visited(&item.path) {
                        debug!(path = %item.path, "Already visited");
                        continue;
                    }
                    if !self.process_file(&item, &crumbs).await {
                        return None;
                    }
                }
                ContentKind::Dir => dirs.push(item),
                _ => debug!(path = %item.path, kind = ?item.kind, "Skipping entry"),
            }
        }

        Some(dirs.into_iter().map(|d| (d, crumbs.clone())).collect())
    }

    /// Fetches one file and emits it if it is text. Returns false only when
    /// the consumer has gone away.
    async fn process_file(&self, item: &ContentItem, breadcrumbs: &[Breadcrumb]) -> bool {
        let body = match self.client.file(&self.tree, &item.path, &self.branch).await {
            Ok(body) => body,
            Err(e) => {
                warn!(repo = %self.tree, path = %item.path, error = %e, "Error processing file");
                SessionStats::bump(&self.stats.failed_files);
                return true;
            }
        };

        let sample = decode_body(&body);
        if !self
            .classifier
            .is_text_file(&item.path, body.size, sample.as_deref())
        {
            debug!(path = %item.path, "Skipping binary file");
            SessionStats::bump(&self.stats.skipped_binary);
            return true;
        }

        let content = sample.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
        let details = FileDetails {
            language: self
                .languages
                .language_for_extension(&extension_of(&item.path)),
            line_count: content.as_deref().map_or(0, count_lines),
            content,
        };

        let entity = file_entity(&self.tree, &item.path, body, details, breadcrumbs.to_vec());
        SessionStats::bump(&self.stats.files);
        self.emitter.emit(entity).await
    }
}

/// Decoded file bytes, when the API sent them base64 encoded.
fn decode_body(body: &FileBody) -> Option<Vec<u8>> {
    if body.encoding.as_deref() != Some("base64") {
        return None;
    }
    let content = body.content.as_deref().filter(|c| !c.is_empty())?;
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD.decode(compact).ok()
}

/// Newlines plus one; empty content has no lines.
fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        0
    } else {
        content.matches('\n').count() + 1
    }
}
