// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - crawl: one repository, optionally on a pinned branch
// - search: a search term, or an owner/name identifier to crawl directly
// - discover: every keyword in a file, deduplicated, newest keyword first
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "repo-crawler",
    version,
    about = "Discover GitHub repositories and crawl their content trees",
    long_about = "repo-crawler walks repositories through the GitHub contents API and prints \
                  every repository, directory and text file it finds. Repositories can be \
                  named directly or discovered through keyword search."
)]
pub struct Cli {
    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Optional TOML config file (base_url, timeout_secs, retry, ...)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of directories fetched at the same time per repository
    #[arg(long, global = true)]
    pub max_concurrent_dirs: Option<usize>,

    /// Log debug output (retries, pages, skipped files)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a single repository
    ///
    /// Example: repo-crawler crawl octocat/Hello-World --branch main
    Crawl {
        /// Repository as owner/name
        repo: String,

        /// Branch to crawl; must exist. Defaults to the repository's default branch
        #[arg(long)]
        branch: Option<String>,

        /// Print one JSON object per entity
        #[arg(long)]
        json: bool,
    },

    /// Search for repositories and crawl them (or crawl owner/name directly)
    ///
    /// Example: repo-crawler search airflow operators
    Search {
        /// Search term, or a single owner/name
        #[arg(required = true)]
        terms: Vec<String>,

        /// Print one JSON object per entity
        #[arg(long)]
        json: bool,
    },

    /// Search every keyword in a file and crawl all unique repositories
    ///
    /// Example: repo-crawler discover --keywords words.txt
    Discover {
        /// File with one keyword per line
        #[arg(long, default_value = "words.txt")]
        keywords: PathBuf,

        /// Print one JSON object per entity
        #[arg(long)]
        json: bool,
    },
}
