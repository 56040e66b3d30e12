// src/lib.rs
// =============================================================================
// repo-crawler: discovers GitHub repositories and crawls their content trees.
//
// Flow:
//   Worklist (optional) -> TreeTraverser -> GithubClient -> EntityStream
//
// Modules:
// - config: API settings, retry policy, per-crawl settings
// - error: request and crawl-session errors
// - github: the retrying API client, pagination and wire types
// - crawl: entities, the traverser, the entity stream and the worklist
// - classify: text/binary and language collaborators
// =============================================================================

pub mod classify;
pub mod config;
pub mod crawl;
pub mod error;
pub mod github;

#[cfg(test)]
mod testing;
