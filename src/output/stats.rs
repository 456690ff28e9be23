//! Statistics generation from the audit database
//!
//! This module provides functionality for extracting and displaying
//! per-site audit statistics from the storage layer.

use crate::state::UrlStatus;
use crate::storage::{RunRecord, Storage};
use crate::GaugeError;
use std::collections::HashMap;

/// Audit statistics summary for one site
#[derive(Debug, Clone)]
pub struct AuditStatistics {
    pub site_key: String,

    /// Total number of stored URLs
    pub total_urls: i64,

    /// Count of URLs by status
    pub urls_by_status: HashMap<UrlStatus, i64>,

    /// URLs with extracted metadata
    pub extracted: i64,

    /// Total internal links across extracted pages
    pub total_links: i64,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `site_key` - The site namespace to summarize
pub fn load_statistics(storage: &dyn Storage, site_key: &str) -> Result<AuditStatistics, GaugeError> {
    let urls_by_status = storage.count_by_status(site_key)?;
    let records = storage.fetch_url_records(site_key)?;

    let extracted = records.values().filter(|r| r.is_extracted()).count() as i64;
    let total_links = records
        .values()
        .map(|r| r.internal_links.len() as i64)
        .sum();

    Ok(AuditStatistics {
        site_key: site_key.to_string(),
        total_urls: urls_by_status.values().sum(),
        urls_by_status,
        extracted,
        total_links,
        latest_run: storage.latest_run(site_key)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &AuditStatistics) {
    println!("=== Audit Statistics: {} ===\n", stats.site_key);

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status.to_db_string());
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Config hash: {}", run.config_hash);
            println!(
                "  Discovered: {} ({} indexed), extracted: {}, failed: {}",
                run.counts.discovered, run.counts.indexed, run.counts.extracted, run.counts.failed
            );
            println!();
        }
        None => println!("No runs recorded\n"),
    }

    println!("URLs by Status:");
    for status in UrlStatus::all() {
        let count = stats.urls_by_status.get(&status).copied().unwrap_or(0);
        let percentage = if stats.total_urls > 0 {
            (count as f64 / stats.total_urls as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!("Extraction:");
    println!("  Pages with metadata: {} / {}", stats.extracted, stats.total_urls);
    println!("  Internal links: {}", stats.total_links);
}
