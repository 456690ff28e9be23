//! Audit session
//!
//! One [`AuditSession`] owns everything a run over one site needs: the
//! configuration, the page source, the storage backend and the site key
//! that namespaces it. Phases run strictly in order: discovery completes
//! before sampling, and sampling freezes before extraction.

use crate::boilerplate::sample_boilerplate;
use crate::config::{Config, Renderer};
use crate::discovery::{discover, DiscoveryReport};
use crate::extraction::{ExtractionCoordinator, ExtractionReport};
use crate::graph::LinkGraph;
use crate::output::export_csv;
use crate::render::{HttpPageSource, PageSource, RenderOptions, RenderPool};
use crate::storage::{open_storage, RunCounts, Storage};
use crate::url::site_key;
use crate::Result;
#[cfg(not(feature = "browser"))]
use crate::ConfigError;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

/// Outcome of a full run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: i64,
    pub discovery: DiscoveryReport,
    pub extraction: ExtractionReport,
    /// Rows written when a CSV path is configured
    pub csv_rows: Option<usize>,
}

impl RunSummary {
    fn counts(&self) -> RunCounts {
        RunCounts {
            discovered: self.discovery.total() as i64,
            indexed: self.discovery.indexed as i64,
            extracted: self.extraction.extracted as i64,
            failed: self.extraction.failed as i64,
        }
    }
}

/// Per-run state for auditing one site
pub struct AuditSession {
    config: Config,
    config_hash: String,
    root: Url,
    site_key: String,
    source: Arc<dyn PageSource>,
    storage: Box<dyn Storage>,
}

impl AuditSession {
    /// Creates a session over explicit collaborators
    pub fn new(
        config: Config,
        config_hash: impl Into<String>,
        source: Arc<dyn PageSource>,
        storage: Box<dyn Storage>,
    ) -> Result<Self> {
        let root = Url::parse(&config.site.root_url)?;
        let site_key = site_key(&config.site.root_url)?;

        Ok(Self {
            config,
            config_hash: config_hash.into(),
            root,
            site_key,
            source,
            storage,
        })
    }

    /// Creates a session over the configured renderer that stores to the
    /// configured SQLite database
    pub fn open(config: Config, config_hash: impl Into<String>) -> Result<Self> {
        let source = page_source(&config)?;
        let storage = open_storage(Path::new(&config.output.database_path))?;
        Self::new(config, config_hash, source, Box::new(storage))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Storage namespace of the audited site
    pub fn site_key(&self) -> &str {
        &self.site_key
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Discovers the site's URLs and persists their statuses
    pub async fn discover(&mut self) -> Result<DiscoveryReport> {
        info!("Discovering URLs of {}", self.root);
        let discovery = discover(self.source.as_ref(), &self.root, &self.config).await;
        self.storage
            .save_url_statuses(&self.site_key, &discovery.statuses)?;
        Ok(discovery.report)
    }

    /// Extracts every stored `Indexed` URL and rebuilds the link graph
    ///
    /// Statuses come from storage, so this also works after a separate
    /// discovery run. A URL that fails loses any metadata an earlier run
    /// stored for it, and the graph is rebuilt from the stored records.
    pub async fn extract(&mut self) -> Result<ExtractionReport> {
        let records = self.storage.fetch_url_records(&self.site_key)?;
        let targets: Vec<String> = records
            .values()
            .filter(|record| record.status.is_indexed())
            .map(|record| record.url.clone())
            .collect();

        if targets.is_empty() {
            info!("No indexed URLs stored for {}, nothing to extract", self.site_key);
            return Ok(ExtractionReport::default());
        }

        let extraction = &self.config.extraction;
        let pool = RenderPool::new(
            Arc::clone(&self.source),
            extraction.effective_render_slots(),
            RenderOptions::new(timeout(&self.config), self.config.http.block_resources.clone()),
        )
        .with_retries(extraction.render_retries);

        info!(
            "Extracting {} indexed URLs ({} tasks, {} render slots)",
            targets.len(),
            extraction.effective_concurrency(),
            extraction.effective_render_slots()
        );

        let filter = sample_boilerplate(&pool, &self.root, &targets, extraction).await;
        let coordinator = ExtractionCoordinator::new(
            pool,
            filter,
            self.root.clone(),
            extraction.effective_concurrency(),
            self.config.discovery.max_path_segments,
        );
        let result = coordinator.run(&targets).await;

        let extracted: HashSet<&str> = result.records.iter().map(|r| r.url.as_str()).collect();
        let failed: Vec<String> = targets
            .iter()
            .filter(|url| !extracted.contains(url.as_str()))
            .cloned()
            .collect();

        self.storage
            .update_metadata(&self.site_key, &result.records)?;
        self.storage.clear_metadata(&self.site_key, &failed)?;

        // the graph counts every stored extracted page, not just this pass
        let stored = self.storage.fetch_url_records(&self.site_key)?;
        let graph = LinkGraph::build(stored.values().filter(|record| record.is_extracted()));
        self.storage.set_incoming_counts(&self.site_key, &graph)?;
        info!("Link graph: {} linked URLs", graph.len());

        Ok(result.report)
    }

    /// Writes every stored record of the site to `path`
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        let records = self.storage.fetch_url_records(&self.site_key)?;
        export_csv(&records, path)
    }

    /// Full audit: discover, extract, link graph, then the optional CSV
    ///
    /// The run is recorded in storage. A storage or export failure marks it
    /// failed and is returned; page-level failures only lower the counts.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let run_id = self
            .storage
            .create_run(&self.site_key, &self.config_hash)?;
        info!("Starting audit run {} for {}", run_id, self.site_key);

        match self.run_phases(run_id).await {
            Ok(summary) => {
                self.storage.complete_run(run_id, &summary.counts())?;
                info!(
                    "Run {} complete: {} URLs discovered, {} pages extracted",
                    run_id,
                    summary.discovery.total(),
                    summary.extraction.extracted
                );
                Ok(summary)
            }
            Err(e) => {
                error!("Run {} failed: {}", run_id, e);
                if let Err(mark) = self.storage.fail_run(run_id) {
                    error!("Could not mark run {} as failed: {}", run_id, mark);
                }
                Err(e)
            }
        }
    }

    async fn run_phases(&mut self, run_id: i64) -> Result<RunSummary> {
        let discovery = self.discover().await?;
        let extraction = self.extract().await?;

        let csv_rows = match self.config.output.csv_path.clone() {
            Some(path) => Some(self.export_csv(Path::new(&path))?),
            None => None,
        };

        Ok(RunSummary {
            run_id,
            discovery,
            extraction,
            csv_rows,
        })
    }
}

fn page_source(config: &Config) -> Result<Arc<dyn PageSource>> {
    match config.http.renderer {
        Renderer::Http => Ok(Arc::new(HttpPageSource::from_config(
            &config.user_agent,
            timeout(config),
        )?)),
        #[cfg(feature = "browser")]
        Renderer::Browser => Ok(Arc::new(crate::render::BrowserPageSource::from_config(
            &config.user_agent,
            timeout(config),
        )?)),
        #[cfg(not(feature = "browser"))]
        Renderer::Browser => Err(ConfigError::Validation(
            "renderer = \"browser\" needs a build with the `browser` feature".to_string(),
        )
        .into()),
    }
}

fn timeout(config: &Config) -> Duration {
    Duration::from_millis(config.http.timeout_ms)
}
