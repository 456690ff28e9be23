//! Frontier Crawler
//!
//! Breadth-first traversal of same-origin links from the site root. Each
//! round takes up to `batch_width` queued URLs, fetches them concurrently
//! and enqueues every unseen normalized link. The visited set never grows
//! past `page_cap`.

use crate::render::PageSource;
use crate::url::{normalize_internal, normalize_parsed, resolve_link};
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Crawl limits
#[derive(Debug, Clone, Copy)]
pub struct CrawlLimits {
    pub page_cap: usize,
    pub batch_width: usize,
    pub max_path_segments: usize,
    pub timeout: Duration,
}

/// Extracts normalized same-origin links from a page
///
/// Relative hrefs resolve against `page_url`; origin is checked against
/// `root`. Links that fail to normalize are dropped.
pub fn same_origin_links(html: &str, page_url: &Url, root: &Url, max_segments: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(absolute) = resolve_link(href, page_url) else {
                continue;
            };
            if let Some(normalized) = normalize_internal(&absolute, root, max_segments) {
                links.push(normalized);
            }
        }
    }

    links
}

/// Breadth-first crawler over one origin
pub struct FrontierCrawler<'a> {
    source: &'a dyn PageSource,
    root: Url,
    limits: CrawlLimits,
}

impl<'a> FrontierCrawler<'a> {
    pub fn new(source: &'a dyn PageSource, root: Url, limits: CrawlLimits) -> Self {
        Self {
            source,
            root,
            limits,
        }
    }

    /// Crawls from the root and returns every visited URL, root included
    ///
    /// Pages that fail to load count as visited but contribute no links.
    pub async fn crawl(&self) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();

        let seed = match normalize_parsed(&self.root, self.limits.max_path_segments) {
            Ok(seed) => seed,
            Err(e) => {
                debug!("Cannot crawl from {}: {}", self.root, e);
                return visited;
            }
        };

        let page_cap = self.limits.page_cap;
        let batch_width = self.limits.batch_width.max(1);
        let mut queued: HashSet<String> = HashSet::from([seed.clone()]);
        let mut frontier: VecDeque<String> = VecDeque::from([seed]);
        let mut rounds = 0;

        while !frontier.is_empty() && visited.len() < page_cap {
            let take = batch_width
                .min(page_cap - visited.len())
                .min(frontier.len());
            let batch: Vec<String> = frontier.drain(..take).collect();
            visited.extend(batch.iter().cloned());
            rounds += 1;

            let results: Vec<Vec<String>> = stream::iter(batch)
                .map(|url| self.links_of(url))
                .buffered(batch_width)
                .collect()
                .await;

            for link in results.into_iter().flatten() {
                if queued.insert(link.clone()) {
                    frontier.push_back(link);
                }
            }
        }

        info!(
            "Crawl visited {} pages in {} rounds ({} left in frontier)",
            visited.len(),
            rounds,
            frontier.len()
        );
        visited
    }

    async fn links_of(&self, url: String) -> Vec<String> {
        let page = match self.source.fetch(&url, self.limits.timeout).await {
            Ok(page) if page.status == 200 => page,
            Ok(page) => {
                debug!("Skipping {}: HTTP {}", url, page.status);
                return Vec::new();
            }
            Err(e) => {
                debug!("Skipping {}: {}", url, e);
                return Vec::new();
            }
        };

        let Ok(page_url) = Url::parse(&url) else {
            return Vec::new();
        };

        same_origin_links(
            &page.body,
            &page_url,
            &self.root,
            self.limits.max_path_segments,
        )
    }
}
