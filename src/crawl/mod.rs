// src/crawl/mod.rs
// =============================================================================
// This module crawls repositories.
//
// Submodules:
// - entity: TreeId, breadcrumbs and the entities a crawl produces
// - emitter: the channel-backed stream entities flow through
// - traverse: walks one repository with bounded parallelism
// - queue: the discovery worklist that decides which repository is next
//
// Rust concepts:
// - Streams: entities arrive one at a time while the crawl is still running
// - Arc + Mutex: state shared between concurrent directory tasks
// - Semaphore: caps how many directories are being fetched at once
// =============================================================================

mod emitter;
mod entity;
mod queue;
mod traverse;

pub use emitter::{CrawlItem, EntityStream};
pub use entity::{
    Breadcrumb, DirectoryEntity, Entity, EntityKind, FileEntity, RepositoryEntity, TreeId,
};
pub use queue::{read_keywords, SessionReport, Worklist};
pub use traverse::{SessionStats, TreeTraverser, DEFAULT_MAX_CONCURRENT_DIRS};
