//! Extraction Coordinator
//!
//! Renders and extracts every target URL under a bounded number of
//! concurrent tasks. A page that fails is logged and left out; the run
//! carries on with the rest.

use super::metadata::extract_metadata;
use crate::boilerplate::BoilerplateFilter;
use crate::render::{FetchError, RenderPool};
use crate::state::{UrlRecord, UrlStatus};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use url::Url;

/// Counts describing one extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub attempted: usize,
    pub extracted: usize,
    pub failed: usize,
    /// Boilerplate blocks pruned over all pages
    pub pruned_blocks: usize,
    /// Navigational anchors left out of link sets over all pages
    pub skipped_nav_links: usize,
}

/// Records produced by one pass, sorted by URL, plus its report
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<UrlRecord>,
    pub report: ExtractionReport,
}

/// Runs the Metadata Extractor over many URLs
pub struct ExtractionCoordinator {
    pool: RenderPool,
    filter: Arc<BoilerplateFilter>,
    root: Url,
    concurrency: usize,
    max_segments: usize,
}

impl ExtractionCoordinator {
    pub fn new(
        pool: RenderPool,
        filter: BoilerplateFilter,
        root: Url,
        concurrency: usize,
        max_segments: usize,
    ) -> Self {
        Self {
            pool,
            filter: Arc::new(filter),
            root,
            concurrency: concurrency.max(1),
            max_segments,
        }
    }

    /// Extracts every URL in `targets`
    ///
    /// Each URL yields at most one record. Duplicate targets are extracted
    /// once.
    pub async fn run(&self, targets: &[String]) -> Extraction {
        let mut urls: Vec<String> = targets.to_vec();
        urls.sort();
        urls.dedup();

        let limit = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for url in urls.iter().cloned() {
            let limit = Arc::clone(&limit);
            let pool = self.pool.clone();
            let filter = Arc::clone(&self.filter);
            let root = self.root.clone();
            let max_segments = self.max_segments;

            tasks.spawn(async move {
                let _permit = limit.acquire_owned().await.map_err(|_| FetchError::PoolClosed)?;
                let page_url = Url::parse(&url).map_err(|e| FetchError::Network {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

                let html = pool.render(&url).await?;
                let metadata = extract_metadata(&html, &page_url, &root, &filter, max_segments);
                debug!(
                    "Extracted {}: {} internal links, {} headings",
                    url,
                    metadata.internal_links.len(),
                    metadata.headings.total()
                );
                Ok::<_, FetchError>((url, metadata))
            });
        }

        let mut extraction = Extraction {
            records: Vec::with_capacity(urls.len()),
            report: ExtractionReport {
                attempted: urls.len(),
                ..Default::default()
            },
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((url, metadata))) => {
                    extraction.report.pruned_blocks += metadata.pruned_blocks;
                    extraction.report.skipped_nav_links += metadata.skipped_nav_links;
                    extraction
                        .records
                        .push(metadata.into_record(url, UrlStatus::Indexed));
                }
                Ok(Err(e)) => {
                    warn!("Skipping page: {}", e);
                    extraction.report.failed += 1;
                }
                Err(e) => {
                    warn!("Extraction task failed: {}", e);
                    extraction.report.failed += 1;
                }
            }
        }

        extraction.records.sort_by(|a, b| a.url.cmp(&b.url));
        extraction.report.extracted = extraction.records.len();

        info!(
            "Extracted {}/{} pages ({} failed, {} boilerplate blocks pruned)",
            extraction.report.extracted,
            extraction.report.attempted,
            extraction.report.failed,
            extraction.report.pruned_blocks
        );
        extraction
    }
}
