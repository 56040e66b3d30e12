// src/github/mod.rs
// =============================================================================
// This module talks to the GitHub REST API.
//
// Submodules:
// - transport: one raw GET (reqwest in production, a fake in tests)
// - fetch: the retrying client and the typed endpoints
// - paginate: page-by-page listing endpoints
// - types: serde shapes of the API responses
// =============================================================================

mod fetch;
mod paginate;
mod transport;
pub mod types;

pub use fetch::GithubClient;
pub use transport::{HttpTransport, RawResponse, Transport};
