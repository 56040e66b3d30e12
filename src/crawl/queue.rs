// src/crawl/queue.rs
// =============================================================================
// This module turns searches into a list of repositories to crawl.
//
// How it works:
// 1. Each keyword is searched; every repository not seen before is pushed
//    onto a stack and added to the seen-set
// 2. An argument that looks like owner/name skips the search and is pushed
//    directly
// 3. drain() pops the stack and crawls one repository at a time until the
//    stack is empty
//
// Ordering:
// - The stack is LIFO, so repositories found by the LAST keyword are crawled
//   FIRST
// - A repository found by two keywords keeps the position of its first
//   discovery; later discoveries are ignored
// - The seen-set only grows: nothing is crawled twice in one run
//
// A session that fails (bad branch, unreachable repository) is recorded in
// its report and the drain moves on to the next repository.
// =============================================================================

use anyhow::{Context, Result};
use futures::StreamExt;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use super::entity::{Entity, TreeId};
use super::traverse::TreeTraverser;
use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::github::GithubClient;

/// Outcome of crawling one repository from the worklist.
#[derive(Debug)]
pub struct SessionReport {
    pub tree: TreeId,
    pub entities: usize,
    /// Why the session was aborted, if it was
    pub error: Option<CrawlError>,
}

/// LIFO stack of repositories to crawl, with a seen-set for dedup.
#[derive(Debug, Default)]
pub struct Worklist {
    stack: Vec<TreeId>,
    seen: HashSet<TreeId>,
    // keyword -> everything its search returned, duplicates included
    discovered: Vec<(String, Vec<TreeId>)>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `tree` unless it was seen before. Returns whether it was added.
    pub fn push(&mut self, tree: TreeId) -> bool {
        if !self.seen.insert(tree.clone()) {
            return false;
        }
        self.stack.push(tree);
        true
    }

    pub fn pop(&mut self) -> Option<TreeId> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn has_seen(&self, tree: &TreeId) -> bool {
        self.seen.contains(tree)
    }

    /// Keyword to repositories map, in the order keywords were searched.
    pub fn discovered(&self) -> &[(String, Vec<TreeId>)] {
        &self.discovered
    }

    /// Searches `keyword` and pushes every new repository it finds.
    /// Returns how many were new.
    pub async fn discover(&mut self, client: &GithubClient, keyword: &str) -> Result<usize, CrawlError> {
        info!(%keyword, "Searching for repositories");
        let names = client.search_repositories(keyword).await?;

        let mut found = Vec::new();
        let mut added = 0;
        for name in names {
            match TreeId::parse(&name) {
                Ok(tree) => {
                    info!(repo = %tree, "Found repository");
                    if self.push(tree.clone()) {
                        added += 1;
                    }
                    found.push(tree);
                }
                Err(e) => warn!(%name, error = %e, "Ignoring search result"),
            }
        }

        self.discovered.push((keyword.to_string(), found));
        Ok(added)
    }

    /// Pushes `target` directly when it is an owner/name identifier,
    /// otherwise treats it as a search term.
    pub async fn add_target(&mut self, client: &GithubClient, target: &str) -> Result<usize, CrawlError> {
        let target = target.trim();
        if target.contains('/') {
            let tree = TreeId::parse(target)?;
            Ok(usize::from(self.push(tree)))
        } else {
            self.discover(client, target).await
        }
    }

    // Crawls every queued repository, one at a time, newest first
    //
    // Parameters:
    //   traverser: Starts one crawl session per repository
    //   on_entity: Called with every entity as it arrives
    //
    // Returns: one SessionReport per repository, in crawl order
    //
    // Example:
    //   keywords "alpha" -> [a/1, a/2], then "beta" -> [a/2, b/1]
    //   stack is [a/1, a/2, b/1] (a/2 not pushed twice)
    //   crawl order: b/1, a/2, a/1
    pub async fn drain<F>(&mut self, traverser: &TreeTraverser, mut on_entity: F) -> Vec<SessionReport>
    where
        F: FnMut(&TreeId, &Entity),
    {
        info!(repos = self.len(), "Starting crawl of queued repositories");
        let mut reports = Vec::new();

        while let Some(tree) = self.pop() {
            let mut stream = traverser.crawl(CrawlConfig::new(tree.clone()));
            let mut report = SessionReport { tree: tree.clone(), entities: 0, error: None };

            while let Some(item) = stream.next().await {
                match item {
                    Ok(entity) => {
                        on_entity(&tree, &entity);
                        report.entities += 1;
                    }
                    Err(e) => {
                        warn!(repo = %tree, error = %e, "Error crawling repository");
                        report.error = Some(e);
                    }
                }
            }

            reports.push(report);
        }

        reports
    }
}

/// Reads keywords one per line, skipping blank lines.
pub async fn read_keywords(path: &Path) -> Result<Vec<String>> {
    info!(path = %path.display(), "Reading keywords");
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read keywords file: {}", path.display()))?;
    Ok(parse_keywords(&content))
}

fn parse_keywords(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Vec as a stack?
//    - push() adds to the end, pop() removes from the end
//    - That is exactly last-in, first-out (LIFO)
//    - A VecDeque would only be needed to take from the front
//
// 2. Why does HashSet::insert return a bool?
//    - true if the value was new, false if it was already there
//    - One call both checks and records, so there is no separate contains()
//
// 3. What is FnMut?
//    - A closure that may change the variables it captured
//    - drain() calls it once per entity, so a counter or a Vec can live in
//      the caller
// -----------------------------------------------------------------------------
