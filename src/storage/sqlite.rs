//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::graph::LinkGraph;
use crate::state::{HeadingCounts, UrlRecord, UrlStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunCounts, RunRecord, RunStatus};
use crate::GaugeError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, GaugeError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, GaugeError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_links(&self, site_key: &str) -> StorageResult<HashMap<String, Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT from_url, to_url FROM internal_links WHERE site_key = ?1 ORDER BY from_url, to_url",
        )?;

        let rows = stmt.query_map(params![site_key], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut links: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let (from, to) = row?;
            links.entry(from).or_default().push(to);
        }
        Ok(links)
    }
}

fn parse_status(value: String) -> StorageResult<UrlStatus> {
    UrlStatus::from_db_string(&value).ok_or(StorageError::CorruptValue {
        column: "status",
        value,
    })
}

fn parse_timestamp(value: Option<String>) -> StorageResult<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| StorageError::CorruptValue {
                column: "extracted_at",
                value: text,
            }),
    }
}

/// Raw column values of one `url_records` row
struct RecordRow {
    url: String,
    status: String,
    title: Option<String>,
    description: Option<String>,
    headings: [Option<u32>; 6],
    incoming: Option<u32>,
    extracted_at: Option<String>,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            status: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            headings: [
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
            ],
            incoming: row.get(10)?,
            extracted_at: row.get(11)?,
        })
    }

    fn into_record(self) -> StorageResult<UrlRecord> {
        let mut record = UrlRecord::discovered(self.url, parse_status(self.status)?);
        record.title = self.title;
        record.description = self.description;
        record.incoming_link_count = self.incoming;
        record.extracted_at = parse_timestamp(self.extracted_at)?;

        if self.headings.iter().all(Option::is_some) {
            record.headings = Some(HeadingCounts::new(self.headings.map(|c| c.unwrap_or(0))));
        }

        Ok(record)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        site_key: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
        counts: RunCounts {
            discovered: row.get(6)?,
            indexed: row.get(7)?,
            extracted: row.get(8)?,
            failed: row.get(9)?,
        },
    })
}

impl Storage for SqliteStorage {
    // ===== Site Records =====

    fn exists(&self, site_key: &str) -> StorageResult<bool> {
        let found: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM url_records WHERE site_key = ?1)
                 OR EXISTS(SELECT 1 FROM runs WHERE site_key = ?1)",
            params![site_key],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn fetch_url_records(&self, site_key: &str) -> StorageResult<BTreeMap<String, UrlRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, status, title, description, h1, h2, h3, h4, h5, h6,
                    incoming_link_count, extracted_at
             FROM url_records WHERE site_key = ?1",
        )?;

        let rows = stmt
            .query_map(params![site_key], RecordRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut links = self.load_links(site_key)?;
        let mut records = BTreeMap::new();

        for row in rows {
            let mut record = row.into_record()?;
            record.internal_links = links.remove(&record.url).unwrap_or_default();
            records.insert(record.url.clone(), record);
        }

        Ok(records)
    }

    fn save_url_statuses(
        &mut self,
        site_key: &str,
        statuses: &BTreeMap<String, UrlStatus>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO url_records (site_key, url, status, discovered_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(site_key, url) DO UPDATE SET
                     status = CASE WHEN excluded.status = 'non-indexed'
                                   THEN 'non-indexed'
                                   ELSE url_records.status END",
            )?;

            for (url, status) in statuses {
                stmt.execute(params![site_key, url, status.to_db_string(), now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_metadata(&mut self, site_key: &str, records: &[UrlRecord]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO url_records (site_key, url, status, title, description,
                                          h1, h2, h3, h4, h5, h6, discovered_at, extracted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(site_key, url) DO UPDATE SET
                     title = excluded.title,
                     description = excluded.description,
                     h1 = excluded.h1, h2 = excluded.h2, h3 = excluded.h3,
                     h4 = excluded.h4, h5 = excluded.h5, h6 = excluded.h6,
                     extracted_at = excluded.extracted_at",
            )?;
            let mut clear_links =
                tx.prepare("DELETE FROM internal_links WHERE site_key = ?1 AND from_url = ?2")?;
            let mut insert_link = tx.prepare(
                "INSERT OR IGNORE INTO internal_links (site_key, from_url, to_url) VALUES (?1, ?2, ?3)",
            )?;

            for record in records {
                let headings = record.headings.map(|h| h.as_array());
                let level = |i: usize| headings.map(|h| h[i]);
                let extracted_at = record
                    .extracted_at
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| now.clone());

                upsert.execute(params![
                    site_key,
                    record.url,
                    record.status.to_db_string(),
                    record.title,
                    record.description,
                    level(0),
                    level(1),
                    level(2),
                    level(3),
                    level(4),
                    level(5),
                    now,
                    extracted_at,
                ])?;

                clear_links.execute(params![site_key, record.url])?;
                for link in &record.internal_links {
                    insert_link.execute(params![site_key, record.url, link])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_metadata(&mut self, site_key: &str, urls: &[String]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut clear_record = tx.prepare(
                "UPDATE url_records SET title = NULL, description = NULL,
                     h1 = NULL, h2 = NULL, h3 = NULL, h4 = NULL, h5 = NULL, h6 = NULL,
                     extracted_at = NULL
                 WHERE site_key = ?1 AND url = ?2",
            )?;
            let mut clear_links =
                tx.prepare("DELETE FROM internal_links WHERE site_key = ?1 AND from_url = ?2")?;
            for url in urls {
                clear_record.execute(params![site_key, url])?;
                clear_links.execute(params![site_key, url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn set_incoming_counts(&mut self, site_key: &str, graph: &LinkGraph) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "UPDATE url_records SET incoming_link_count = 0 WHERE site_key = ?1",
            params![site_key],
        )?;
        {
            let mut stmt = tx.prepare(
                "UPDATE url_records SET incoming_link_count = ?1 WHERE site_key = ?2 AND url = ?3",
            )?;
            for (url, count) in graph.iter() {
                stmt.execute(params![count, site_key, url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn count_by_status(&self, site_key: &str) -> StorageResult<HashMap<UrlStatus, i64>> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM url_records WHERE site_key = ?1 GROUP BY status",
        )?;

        let rows = stmt.query_map(params![site_key], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (status, count) = row?;
            counts.insert(parse_status(status)?, count);
        }
        Ok(counts)
    }

    // ===== Run Management =====

    fn create_run(&mut self, site_key: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (site_key, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![site_key, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, counts: &RunCounts) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, discovered_count = ?3,
                 indexed_count = ?4, extracted_count = ?5, failed_count = ?6
             WHERE id = ?7",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                counts.discovered,
                counts.indexed,
                counts.extracted,
                counts.failed,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Failed.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self, site_key: &str) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, site_key, started_at, finished_at, config_hash, status,
                        discovered_count, indexed_count, extracted_count, failed_count
                 FROM runs WHERE site_key = ?1 ORDER BY id DESC LIMIT 1",
                params![site_key],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}
