//! Trending-Harvester main entry point
//!
//! This is the command-line interface for the daily trending-repositories
//! archiver.

use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use trending_harvester::archive::{self, ArchiveStore};
use trending_harvester::config::{load_config_with_hash, Config};
use trending_harvester::harvest::{harvest, BatchScheduler, LanguageTable};
use trending_harvester::output::{print_summary, RunOutcome};

/// Exit status when every language failed but the report was still written
const EXIT_ALL_FAILED: u8 = 2;

/// Trending-Harvester: a daily trending-repositories archiver
///
/// Collects the trending repositories of each configured language, writes
/// them to a dated Markdown report under a year/month archive and keeps the
/// archive's `metadata.json` index up to date.
#[derive(Parser, Debug)]
#[command(name = "trending-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A daily trending-repositories archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Date to file the report under (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    date: Option<NaiveDate>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be collected without collecting
    #[arg(long, conflicts_with_all = ["rebuild_metadata", "sweep_only"])]
    dry_run: bool,

    /// Rebuild metadata.json from the archive tree and exit
    #[arg(long, conflicts_with_all = ["dry_run", "sweep_only"])]
    rebuild_metadata: bool,

    /// File loose reports into their year/month folders and exit
    #[arg(long, conflicts_with_all = ["dry_run", "rebuild_metadata"])]
    sweep_only: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

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

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, date);
        Ok(ExitCode::SUCCESS)
    } else if cli.rebuild_metadata {
        handle_rebuild_metadata(&config)?;
        Ok(ExitCode::SUCCESS)
    } else if cli.sweep_only {
        handle_sweep_only(&config)?;
        Ok(ExitCode::SUCCESS)
    } else {
        handle_harvest(&config, date, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trending_harvester=info,warn"),
            1 => EnvFilter::new("trending_harvester=debug,info"),
            2 => EnvFilter::new("trending_harvester=trace,debug"),
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

/// Handles the --dry-run mode: shows URLs, chunks and the target path
fn handle_dry_run(config: &Config, date: NaiveDate) {
    println!("=== Trending-Harvester Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Base URL: {}", config.scraper.base_url);
    println!("  Window: {}", config.scraper.since);
    println!("  Concurrency limit: {}", config.scraper.concurrency_limit);
    println!(
        "  Polite delay: {}-{}ms",
        config.scraper.polite_delay_min_ms, config.scraper.polite_delay_max_ms
    );

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}ms doubling, capped at {}ms, jitter up to {}ms",
        config.retry.base_delay_ms, config.retry.max_delay_ms, config.retry.jitter_ms
    );

    let table = LanguageTable::with_overrides(&config.slugs);
    let scheduler = BatchScheduler::new(config.scraper.concurrency_limit as usize);

    println!("\nLanguages ({}):", config.languages.len());
    for (index, chunk) in scheduler.chunks(&config.languages).enumerate() {
        println!("  Chunk {}:", index + 1);
        for language in chunk {
            println!(
                "    - {} -> {}",
                language,
                table.url_for(&config.scraper.base_url, language, &config.scraper.since)
            );
        }
    }

    let store = ArchiveStore::new(config.archive.root.clone());
    println!("\nArchive:");
    println!("  Root: {}", store.root().display());
    println!("  Report: {}", store.report_path(date).display());
    println!(
        "  Sweep this run: {}",
        if ArchiveStore::should_sweep(config.archive.sweep, date) {
            "yes"
        } else {
            "no"
        }
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --rebuild-metadata mode
fn handle_rebuild_metadata(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let root = &config.archive.root;
    tracing::info!("Rebuilding metadata for {}", root.display());

    let index = archive::rebuild(root)?;
    let path = archive::write_index(root, &index)?;

    println!(
        "✓ Indexed {} report(s) into {}",
        index.report_count(),
        path.display()
    );
    Ok(())
}

/// Handles the --sweep-only mode, regardless of the configured trigger
fn handle_sweep_only(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = ArchiveStore::new(config.archive.root.clone());
    let moved = store.archive_stale_files()?;

    if moved.is_empty() {
        println!("Nothing to archive");
    } else {
        println!("Archived {} report(s):", moved.len());
        for path in &moved {
            println!("  - {}", path.display());
        }
    }
    Ok(())
}

/// Handles the main harvest run
async fn handle_harvest(
    config: &Config,
    date: NaiveDate,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing::info!(
        "Languages: {}, archive: {}",
        config.languages.len(),
        config.archive.root.display()
    );

    let report = match harvest(config, date).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_summary(&report.summary);
        println!("✓ Report written to: {}", report.report_path.display());
    }

    if report.summary.outcome() == RunOutcome::AllFailed {
        tracing::error!("Every language failed collection");
        return Ok(ExitCode::from(EXIT_ALL_FAILED));
    }

    tracing::info!("Harvest completed successfully");
    Ok(ExitCode::SUCCESS)
}
