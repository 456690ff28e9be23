//! Storage module for persisting audit data
//!
//! This module handles persistence of the URL records of each audited site:
//! - SQLite database initialization and schema management
//! - Status upserts from discovery and metadata merges from extraction
//! - Internal link rows and incoming link counts
//! - Run tracking
//!
//! An in-memory backend implements the same trait for callers that do not
//! want anything on disk.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::GaugeError;
use std::path::Path;

/// Opens (creating if needed) the SQLite database at `path`
pub fn open_storage(path: &Path) -> Result<SqliteStorage, GaugeError> {
    SqliteStorage::new(path)
}

/// Represents an audit run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub site_key: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub counts: RunCounts,
}

/// Totals recorded when a run completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// URLs in the discovery status map
    pub discovered: i64,
    /// Of those, how many were indexed
    pub indexed: i64,
    /// Records produced by extraction
    pub extracted: i64,
    /// Indexed URLs that produced no record
    pub failed: i64,
}

/// Status of an audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
