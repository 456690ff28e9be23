//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::graph::LinkGraph;
use crate::state::{UrlRecord, UrlStatus};
use crate::storage::{RunCounts, RunRecord};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt value in column {column}: {value}")]
    CorruptValue { column: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every operation is namespaced by a site key (see
/// [`crate::url::site_key`]), so one database can hold several sites.
pub trait Storage: Send {
    // ===== Site Records =====

    /// Returns true if anything has been stored for `site_key`
    fn exists(&self, site_key: &str) -> StorageResult<bool>;

    /// Loads every record of a site, keyed by URL
    fn fetch_url_records(&self, site_key: &str) -> StorageResult<BTreeMap<String, UrlRecord>>;

    /// Inserts discovery statuses
    ///
    /// New URLs are inserted with their status. For a URL already present a
    /// `NonIndexed` status replaces `Indexed`, never the reverse. Metadata
    /// is left untouched.
    fn save_url_statuses(
        &mut self,
        site_key: &str,
        statuses: &BTreeMap<String, UrlStatus>,
    ) -> StorageResult<()>;

    /// Merges extracted metadata into the stored records
    ///
    /// Title, description, heading counts, internal links and the
    /// extraction time replace whatever was stored. A record whose URL is
    /// unknown is inserted with its own status.
    fn update_metadata(&mut self, site_key: &str, records: &[UrlRecord]) -> StorageResult<()>;

    /// Drops the extracted metadata and outbound links of `urls`
    ///
    /// Status and incoming counts stay. Used for pages that failed in the
    /// current pass, so stale links from an earlier run stop counting.
    fn clear_metadata(&mut self, site_key: &str, urls: &[String]) -> StorageResult<()>;

    /// Writes incoming link counts for every URL of the site
    ///
    /// URLs absent from the graph get zero.
    fn set_incoming_counts(&mut self, site_key: &str, graph: &LinkGraph) -> StorageResult<()>;

    /// Number of stored URLs per status
    fn count_by_status(&self, site_key: &str) -> StorageResult<HashMap<UrlStatus, i64>>;

    // ===== Run Management =====

    /// Creates a new audit run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, site_key: &str, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed with its final counts
    fn complete_run(&mut self, run_id: i64, counts: &RunCounts) -> StorageResult<()>;

    /// Marks a run as failed
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    /// Gets the most recent run of a site
    fn latest_run(&self, site_key: &str) -> StorageResult<Option<RunRecord>>;
}
