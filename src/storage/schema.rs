//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sitegauge database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track audit runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    site_key TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    discovered_count INTEGER NOT NULL DEFAULT 0,
    indexed_count INTEGER NOT NULL DEFAULT 0,
    extracted_count INTEGER NOT NULL DEFAULT 0,
    failed_count INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_runs_site ON runs(site_key);

-- One row per normalized URL of a site
CREATE TABLE IF NOT EXISTS url_records (
    site_key TEXT NOT NULL,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    title TEXT,
    description TEXT,
    h1 INTEGER,
    h2 INTEGER,
    h3 INTEGER,
    h4 INTEGER,
    h5 INTEGER,
    h6 INTEGER,
    incoming_link_count INTEGER,
    discovered_at TEXT NOT NULL,
    extracted_at TEXT,
    PRIMARY KEY (site_key, url)
);

CREATE INDEX IF NOT EXISTS idx_url_records_status ON url_records(site_key, status);

-- Outbound internal links of each extracted page
CREATE TABLE IF NOT EXISTS internal_links (
    site_key TEXT NOT NULL,
    from_url TEXT NOT NULL,
    to_url TEXT NOT NULL,
    PRIMARY KEY (site_key, from_url, to_url)
);

CREATE INDEX IF NOT EXISTS idx_internal_links_to ON internal_links(site_key, to_url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
