//! paap-crawler main entry point
//!
//! This is the command-line interface for the procurement document crawler.

use anyhow::Context;
use clap::Parser;
use paap_crawler::config::{self, load_config_with_hash, Config};
use paap_crawler::crawler::Crawler;
use paap_crawler::output::print_statistics;
use paap_crawler::storage::FsBlobStore;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// paap-crawler: procurement plan discovery
///
/// Crawls a list of institutional sites, follows procurement-related links
/// within each site and downloads the spreadsheet documents it finds.
#[derive(Parser, Debug)]
#[command(name = "paap-crawler")]
#[command(version)]
#[command(about = "Discovers and downloads public procurement plans", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "list_files")]
    dry_run: bool,

    /// List the spreadsheets already in the download directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    list_files: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.list_files {
        handle_list_files(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("paap_crawler=info,warn"),
            1 => EnvFilter::new("paap_crawler=debug,info"),
            2 => EnvFilter::new("paap_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        config::validate(&config).context("Built-in configuration is invalid")?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== paap-crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max concurrent visits: {}", config.crawler.max_concurrent_visits);
    println!("  Max pages per run: {}", config.crawler.max_pages);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);
    println!(
        "  Visited retention: {}h",
        config.crawler.visited_retention_hours
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Download directory: {}", config.output.download_dir);

    println!("\nVisited set: {:?}", config.visited.backend);
    if let Some(path) = &config.visited.database_path {
        println!("  Database: {}", path);
    }

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", config.seeds.len());
}

/// Handles the --list-files mode: lists downloaded spreadsheets
fn handle_list_files(config: &Config) -> anyhow::Result<()> {
    let store = FsBlobStore::new(&config.output.download_dir).with_context(|| {
        format!("Cannot open download directory {}", config.output.download_dir)
    })?;
    let files = store.list_spreadsheets()?;

    println!("Download directory: {}\n", store.root().display());
    for name in &files {
        println!("  {}", name);
    }
    println!("\n{} spreadsheet files", files.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Total seed URLs: {}", config.seeds.len());

    let crawler = Crawler::new(config).context("Failed to initialize crawler")?;
    let stats = crawler.run().await.context("Crawl failed")?;

    print_statistics(&stats);
    Ok(())
}
