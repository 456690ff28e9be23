//! In-memory storage backend

use crate::graph::LinkGraph;
use crate::state::{UrlRecord, UrlStatus};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunCounts, RunRecord, RunStatus};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

/// Keeps every site in process memory
///
/// Follows the same merge rules as [`super::SqliteStorage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    sites: HashMap<String, BTreeMap<String, UrlRecord>>,
    runs: Vec<RunRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn run_mut(&mut self, run_id: i64) -> StorageResult<&mut RunRecord> {
        self.runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or(StorageError::RunNotFound(run_id))
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, site_key: &str) -> StorageResult<bool> {
        let has_records = self
            .sites
            .get(site_key)
            .map_or(false, |records| !records.is_empty());
        Ok(has_records || self.runs.iter().any(|run| run.site_key == site_key))
    }

    fn fetch_url_records(&self, site_key: &str) -> StorageResult<BTreeMap<String, UrlRecord>> {
        Ok(self.sites.get(site_key).cloned().unwrap_or_default())
    }

    fn save_url_statuses(
        &mut self,
        site_key: &str,
        statuses: &BTreeMap<String, UrlStatus>,
    ) -> StorageResult<()> {
        let records = self.sites.entry(site_key.to_string()).or_default();
        for (url, status) in statuses {
            records
                .entry(url.clone())
                .and_modify(|record| record.status = record.status.merge(*status))
                .or_insert_with(|| UrlRecord::discovered(url.clone(), *status));
        }
        Ok(())
    }

    fn update_metadata(&mut self, site_key: &str, records: &[UrlRecord]) -> StorageResult<()> {
        let stored = self.sites.entry(site_key.to_string()).or_default();
        let now = Utc::now();

        for incoming in records {
            let entry = stored
                .entry(incoming.url.clone())
                .or_insert_with(|| UrlRecord::discovered(incoming.url.clone(), incoming.status));

            entry.title = incoming.title.clone();
            entry.description = incoming.description.clone();
            entry.headings = incoming.headings;
            entry.internal_links = incoming.internal_links.clone();
            entry.internal_links.sort();
            entry.internal_links.dedup();
            entry.extracted_at = Some(incoming.extracted_at.unwrap_or(now));
        }
        Ok(())
    }

    fn clear_metadata(&mut self, site_key: &str, urls: &[String]) -> StorageResult<()> {
        if let Some(records) = self.sites.get_mut(site_key) {
            for url in urls {
                if let Some(record) = records.get_mut(url) {
                    *record = UrlRecord {
                        incoming_link_count: record.incoming_link_count,
                        ..UrlRecord::discovered(url.clone(), record.status)
                    };
                }
            }
        }
        Ok(())
    }

    fn set_incoming_counts(&mut self, site_key: &str, graph: &LinkGraph) -> StorageResult<()> {
        if let Some(records) = self.sites.get_mut(site_key) {
            graph.apply(records.values_mut());
        }
        Ok(())
    }

    fn count_by_status(&self, site_key: &str) -> StorageResult<HashMap<UrlStatus, i64>> {
        let mut counts = HashMap::new();
        if let Some(records) = self.sites.get(site_key) {
            for record in records.values() {
                *counts.entry(record.status).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn create_run(&mut self, site_key: &str, config_hash: &str) -> StorageResult<i64> {
        let id = self.runs.len() as i64 + 1;
        self.runs.push(RunRecord {
            id,
            site_key: site_key.to_string(),
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            config_hash: config_hash.to_string(),
            status: RunStatus::Running,
            counts: RunCounts::default(),
        });
        Ok(id)
    }

    fn complete_run(&mut self, run_id: i64, counts: &RunCounts) -> StorageResult<()> {
        let run = self.run_mut(run_id)?;
        run.status = RunStatus::Completed;
        run.finished_at = Some(Utc::now().to_rfc3339());
        run.counts = *counts;
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        let run = self.run_mut(run_id)?;
        run.status = RunStatus::Failed;
        run.finished_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    fn latest_run(&self, site_key: &str) -> StorageResult<Option<RunRecord>> {
        Ok(self
            .runs
            .iter()
            .rev()
            .find(|run| run.site_key == site_key)
            .cloned())
    }
}
