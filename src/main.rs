//! Sitegauge main entry point
//!
//! This is the command-line interface for the Sitegauge site surveyor.

use clap::Parser;
use sitegauge::config::{load_config_with_hash, Config};
use sitegauge::output::{load_statistics, print_statistics};
use sitegauge::storage::open_storage;
use sitegauge::url::site_key;
use sitegauge::AuditSession;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitegauge: a single-site SEO surveyor
///
/// Sitegauge discovers the URLs of one website from its sitemap and a
/// breadth-first crawl, classifies them against robots.txt, and extracts
/// titles, descriptions, heading counts and internal links with recurring
/// boilerplate filtered out.
#[derive(Parser, Debug)]
#[command(name = "sitegauge")]
#[command(version)]
#[command(about = "A single-site SEO surveyor", long_about = None)]
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

    /// Discover and classify URLs, then stop
    #[arg(long, conflicts_with_all = ["extract_only", "stats", "export_csv", "dry_run"])]
    discover_only: bool,

    /// Extract metadata for the indexed URLs already in the database
    #[arg(long, conflicts_with_all = ["discover_only", "stats", "export_csv", "dry_run"])]
    extract_only: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["discover_only", "extract_only", "export_csv", "dry_run"])]
    stats: bool,

    /// Write the stored records to a CSV file and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["discover_only", "extract_only", "stats", "dry_run"])]
    export_csv: Option<PathBuf>,

    /// Validate config and show what would be audited without fetching anything
    #[arg(long, conflicts_with_all = ["discover_only", "extract_only", "stats", "export_csv"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(path) = &cli.export_csv {
        handle_export_csv(config, config_hash, path)?;
    } else if cli.discover_only {
        handle_discover(config, config_hash).await?;
    } else if cli.extract_only {
        handle_extract(config, config_hash).await?;
    } else {
        handle_audit(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegauge=info,warn"),
            1 => EnvFilter::new("sitegauge=debug,info"),
            2 => EnvFilter::new("sitegauge=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be audited
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Sitegauge Dry Run ===\n");

    println!("Site:");
    println!("  Root URL: {}", config.site.root_url);
    println!("  Site key: {}", site_key(&config.site.root_url)?);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nDiscovery:");
    println!("  Sitemap path: {}", config.discovery.sitemap_path);
    println!("  Sitemap fan-out: {}", config.discovery.sitemap_fan_out);
    println!("  Page cap: {}", config.discovery.page_cap);
    println!("  Batch width: {}", config.discovery.batch_width);
    println!("  Max path segments: {}", config.discovery.max_path_segments);
    println!(
        "  Robots rules: {}",
        if config.robots.per_agent { "per agent" } else { "global" }
    );

    println!("\nExtraction:");
    println!("  Timeout: {}ms", config.http.timeout_ms);
    println!("  Tasks: {}", config.extraction.effective_concurrency());
    println!("  Render slots: {}", config.extraction.effective_render_slots());
    println!("  Render retries: {}", config.extraction.render_retries);
    println!("  Boilerplate: {:?}", config.extraction.boilerplate);
    println!("  Sample size: {}", config.extraction.sample_size);
    println!("  Navigational threshold: {}", config.extraction.nav_threshold);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(csv) = &config.output.csv_path {
        println!("  CSV: {}", csv);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let key = site_key(&config.site.root_url)?;

    let stats = load_statistics(&storage, &key)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-csv mode
fn handle_export_csv(
    config: Config,
    config_hash: String,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = AuditSession::open(config, config_hash)?;
    let rows = session.export_csv(path)?;
    println!("✓ Exported {} URLs to: {}", rows, path.display());
    Ok(())
}

/// Handles the --discover-only mode
async fn handle_discover(config: Config, config_hash: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = AuditSession::open(config, config_hash)?;
    let report = session.discover().await?;
    println!(
        "✓ Discovered {} URLs ({} indexed, {} non-indexed)",
        report.total(),
        report.indexed,
        report.non_indexed
    );
    Ok(())
}

/// Handles the --extract-only mode
async fn handle_extract(config: Config, config_hash: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = AuditSession::open(config, config_hash)?;
    let report = session.extract().await?;
    println!(
        "✓ Extracted {} of {} indexed URLs ({} failed)",
        report.extracted, report.attempted, report.failed
    );
    Ok(())
}

/// Handles the full audit
async fn handle_audit(config: Config, config_hash: String) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Auditing {}", config.site.root_url);

    let mut session = AuditSession::open(config, config_hash)?;
    match session.run().await {
        Ok(summary) => {
            println!("=== Audit Complete: {} ===\n", session.site_key());
            println!(
                "Discovered: {} URLs ({} from sitemaps, {} crawled)",
                summary.discovery.total(),
                summary.discovery.sitemap_urls,
                summary.discovery.crawled_urls
            );
            println!(
                "Indexed: {}, non-indexed: {}",
                summary.discovery.indexed, summary.discovery.non_indexed
            );
            println!(
                "Extracted: {} / {} ({} failed)",
                summary.extraction.extracted, summary.extraction.attempted, summary.extraction.failed
            );
            println!(
                "Boilerplate: {} blocks pruned, {} navigational links skipped",
                summary.extraction.pruned_blocks, summary.extraction.skipped_nav_links
            );
            if let Some(rows) = summary.csv_rows {
                println!("CSV rows: {}", rows);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            Err(e.into())
        }
    }
}
