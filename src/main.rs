// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr) so stdout only carries entities
// 3. Build the API client and the traverser from config + flags
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = all crawls completed, 1 = a crawl was
//    aborted, 2 = error before crawling started)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use repo_crawler::config::{self, ApiConfig, CrawlConfig};
use repo_crawler::crawl::{read_keywords, Entity, SessionReport, TreeId, TreeTraverser, Worklist};
use repo_crawler::github::{GithubClient, HttpTransport};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn setup_logging(verbose: bool) {
    let default = if verbose {
        "repo_crawler=debug,warn"
    } else {
        "repo_crawler=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = build_config(&cli)?;
    let transport = HttpTransport::new(config.timeout).context("Failed to create HTTP client")?;
    let client = Arc::new(GithubClient::new(Arc::new(transport), &config));
    let traverser = TreeTraverser::new(Arc::clone(&client), config.max_concurrent_dirs);

    match cli.command {
        Commands::Crawl { repo, branch, json } => handle_crawl(&traverser, &repo, branch, json).await,
        Commands::Search { terms, json } => {
            handle_search(&client, &traverser, &terms.join(" "), json).await
        }
        Commands::Discover { keywords, json } => {
            handle_discover(&client, &traverser, &keywords, json).await
        }
    }
}

// Config file (if any), then flags on top.
fn build_config(cli: &Cli) -> Result<ApiConfig> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ApiConfig::default(),
    };
    if cli.token.is_some() {
        config.token = cli.token.clone();
    }
    if let Some(n) = cli.max_concurrent_dirs {
        config.max_concurrent_dirs = n;
    }
    config::validate(&config)?;
    Ok(config)
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    traverser: &TreeTraverser,
    repo: &str,
    branch: Option<String>,
    json: bool,
) -> Result<i32> {
    let tree = TreeId::parse(repo)?;
    let mut stream = traverser.crawl(CrawlConfig::new(tree.clone()).with_branch(branch));

    let mut report = SessionReport { tree: tree.clone(), entities: 0, error: None };
    while let Some(item) = stream.next().await {
        match item {
            Ok(entity) => {
                print_entity(&tree, &entity, json);
                report.entities += 1;
            }
            Err(e) => report.error = Some(e),
        }
    }

    Ok(print_summary(&[report], json))
}

// Handles the 'search' subcommand
async fn handle_search(
    client: &GithubClient,
    traverser: &TreeTraverser,
    term: &str,
    json: bool,
) -> Result<i32> {
    let mut worklist = Worklist::new();
    worklist.add_target(client, term).await?;

    status(json, &format!("[+] Starting crawl with {} repos in LIFO stack...", worklist.len()));
    let reports = worklist
        .drain(traverser, |tree, entity| print_entity(tree, entity, json))
        .await;

    Ok(print_summary(&reports, json))
}

// Handles the 'discover' subcommand
async fn handle_discover(
    client: &GithubClient,
    traverser: &TreeTraverser,
    keywords_path: &Path,
    json: bool,
) -> Result<i32> {
    let keywords = read_keywords(keywords_path).await?;
    let mut worklist = Worklist::new();

    for keyword in &keywords {
        if let Err(e) = worklist.discover(client, keyword).await {
            warn!(%keyword, error = %e, "Search failed, skipping keyword");
        }
    }

    status(
        json,
        &format!("[+] Starting crawl with {} unique repos in LIFO stack...", worklist.len()),
    );
    let reports = worklist
        .drain(traverser, |tree, entity| print_entity(tree, entity, json))
        .await;

    status(json, "\n[+] Keyword to Repos mapping:");
    for (keyword, repos) in worklist.discovered() {
        status(json, &format!("\nKeyword: {}", keyword));
        for repo in repos {
            status(json, &format!(" - {}", repo));
        }
    }

    Ok(print_summary(&reports, json))
}

// Human-readable progress line. With --json stdout carries only entity
// objects, so these go to stderr instead.
fn status(json: bool, line: &str) {
    if json {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

fn print_entity(tree: &TreeId, entity: &Entity, json: bool) {
    if json {
        match serde_json::to_string(entity) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(repo = %tree, error = %e, "Could not serialize entity"),
        }
    } else {
        println!("[✓] Entity: {:?} | {}", entity.kind(), entity.label());
    }
}

// Prints one line per repository and returns the exit code.
fn print_summary(reports: &[SessionReport], json: bool) -> i32 {
    status(json, "");
    status(json, &format!("{:<50} {:<10} {}", "REPOSITORY", "ENTITIES", "STATUS"));
    status(json, &"=".repeat(80));

    for report in reports {
        let outcome = match &report.error {
            Some(e) => format!("aborted: {}", e),
            None => "completed".to_string(),
        };
        status(json, &format!("{:<50} {:<10} {}", report.tree, report.entities, outcome));
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    status(json, "");
    status(json, "📊 Summary:");
    status(json, &format!("   ✅ Completed: {}", reports.len() - failed));
    status(json, &format!("   ❌ Aborted: {}", failed));

    if failed > 0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_crawler::error::CrawlError;

    fn report(repo: &str, error: Option<CrawlError>) -> SessionReport {
        SessionReport { tree: TreeId::parse(repo).unwrap(), entities: 3, error }
    }

    #[test]
    fn test_summary_exit_code_in_json_mode() {
        assert_eq!(print_summary(&[report("a/1", None)], true), 0);
        assert_eq!(
            print_summary(&[report("a/1", None), report("b/1", Some(CrawlError::MissingTree))], true),
            1
        );
        assert_eq!(print_summary(&[], false), 0);
    }
}
