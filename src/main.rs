//! search-crawler main entry point
//!
//! This is the command-line interface for the incremental search crawler.

use clap::Parser;
use search_crawler::config::{load_config_with_hash, Config};
use search_crawler::crawler::{spawn_shutdown_listener, Coordinator};
use search_crawler::output::{load_statistics, print_run_report, print_statistics, start_of_today};
use search_crawler::storage::open_storage;
use search_crawler::url::canonicalize;
use search_crawler::ScopeFilter;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file in the working directory, written alongside terminal output
const LOG_FILE: &str = "crawler.log";

/// search-crawler: A polite, incremental web crawler
///
/// search-crawler fetches pages inside a configured scope, stores them in a
/// SQLite document store, and revisits them once their revisit interval has
/// passed, rewriting a document only when its content changed.
#[derive(Parser, Debug)]
#[command(name = "search-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite, incremental web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the document store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity; the guard flushes the log file on exit
    let _log_guard = setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Filter directives for a verbosity level
fn log_directives(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        // Only show errors
        return "error";
    }
    match verbose {
        0 => "search_crawler=info,warn",
        1 => "search_crawler=debug,info",
        2 => "search_crawler=trace,debug",
        _ => "trace",
    }
}

/// Sets up terminal and `crawler.log` logging based on verbosity level
///
/// The returned guard must stay alive until exit so buffered file output is
/// flushed.
fn setup_logging(verbose: u8, quiet: bool) -> WorkerGuard {
    let directives = log_directives(verbose, quiet);

    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new(directives));

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(EnvFilter::new(directives));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== search-crawler Dry Run ===\n");

    let logic = &config.logic;
    println!("Crawl Settings:");
    println!("  Delay: {}s", logic.delay);
    println!("  Max pages: {}", logic.max_pages);
    println!("  Revisit interval: {}s", logic.revisit_interval);
    println!("  Failure backoff: {}s", logic.failure_backoff);
    println!("  Timeout: {}s", logic.timeout);
    println!("  Max retries: {}", logic.max_retries);
    println!("  User agent: {}", logic.user_agent);
    println!("  Accept-Language: {}", logic.accept_language);

    println!("\nDocument Store:");
    println!("  Database: {}", config.db.path);

    let restrictions = &config.restrictions;
    println!("\nAllowed Domains ({}):", restrictions.allowed_domains.len());
    if restrictions.allowed_domains.is_empty() {
        println!("  (any host)");
    }
    for domain in &restrictions.allowed_domains {
        println!("  - {}", domain);
    }

    println!("\nDisallowed Paths ({}):", restrictions.disallowed_paths.len());
    for token in &restrictions.disallowed_paths {
        println!("  - {}", token);
    }

    let scope = ScopeFilter::from_config(restrictions);
    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        let canonical = canonicalize(seed);
        let marker = if scope.is_in_scope(&canonical) {
            ""
        } else {
            " (out of scope, will be skipped)"
        };
        println!("  * {}{}", canonical, marker);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.seeds.len()
    );
}

/// Handles the --stats mode: shows statistics from the document store
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.db.path);

    let storage = match open_storage(&config.db.path) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to open document store {}: {}", config.db.path, e);
            return Err(e.into());
        }
    };

    let stats = load_statistics(&storage, start_of_today())?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Seeds: {}, allowed domains: {}, disallowed paths: {}",
        config.seeds.len(),
        config.restrictions.allowed_domains.len(),
        config.restrictions.disallowed_paths.len()
    );

    let cancel = CancellationToken::new();

    let mut coordinator = match Coordinator::from_config(config, cancel.clone()) {
        Ok(coordinator) => coordinator,
        Err(e) => {
            tracing::error!("Failed to start crawl: {}", e);
            return Err(e.into());
        }
    };

    spawn_shutdown_listener(cancel);

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_run_report(&report);

    let stats = load_statistics(coordinator.storage(), start_of_today())?;
    print_statistics(&stats);

    Ok(())
}
