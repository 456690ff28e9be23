//! Sitemap Resolver
//!
//! Expands a set of sitemap URLs into a flat set of page URLs. Nested
//! sitemaps (any `<loc>` ending in `.xml`) are resolved level by level with
//! at most `fan_out` documents in flight.

use crate::render::PageSource;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Nesting levels followed below the root sitemaps
pub const MAX_SITEMAP_DEPTH: usize = 4;

/// Either a `<urlset>` or a `<sitemapindex>`; the root name is not checked
#[derive(Debug, Default, Deserialize)]
struct SitemapDocument {
    #[serde(default)]
    url: Vec<LocEntry>,
    #[serde(default)]
    sitemap: Vec<LocEntry>,
}

#[derive(Debug, Deserialize)]
struct LocEntry {
    #[serde(default)]
    loc: Option<String>,
}

/// Locations found in one sitemap document
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SitemapEntries {
    /// Page URLs
    pub pages: Vec<String>,
    /// Nested sitemap URLs
    pub sitemaps: Vec<String>,
}

/// Parses one sitemap document
///
/// Malformed XML yields no entries.
pub fn parse_sitemap(xml: &str) -> SitemapEntries {
    let document: SitemapDocument = match quick_xml::de::from_str(xml) {
        Ok(document) => document,
        Err(e) => {
            debug!("Unparsable sitemap: {}", e);
            return SitemapEntries::default();
        }
    };

    let mut entries = SitemapEntries::default();
    for loc in document
        .url
        .into_iter()
        .chain(document.sitemap)
        .filter_map(|entry| entry.loc)
    {
        let loc = loc.trim();
        if loc.is_empty() {
            continue;
        }
        if loc.ends_with(".xml") {
            entries.sitemaps.push(loc.to_string());
        } else {
            entries.pages.push(loc.to_string());
        }
    }
    entries
}

/// Resolves sitemaps through a [`PageSource`]
pub struct SitemapResolver<'a> {
    source: &'a dyn PageSource,
    timeout: Duration,
    fan_out: usize,
}

impl<'a> SitemapResolver<'a> {
    pub fn new(source: &'a dyn PageSource, timeout: Duration, fan_out: usize) -> Self {
        Self {
            source,
            timeout,
            fan_out: fan_out.max(1),
        }
    }

    /// Returns every page URL reachable from `roots`
    ///
    /// A sitemap that fails to load or parse contributes nothing; the
    /// others are still resolved. Each sitemap URL is fetched at most once.
    pub async fn resolve(&self, roots: &[String]) -> BTreeSet<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut level: Vec<String> = roots
            .iter()
            .filter(|root| seen.insert(root.to_string()))
            .cloned()
            .collect();
        let mut pages = BTreeSet::new();
        let mut depth = 0;

        while !level.is_empty() {
            let documents: Vec<SitemapEntries> = stream::iter(level)
                .map(|url| self.load(url))
                .buffer_unordered(self.fan_out)
                .collect()
                .await;

            let mut next = Vec::new();
            for entries in documents {
                pages.extend(entries.pages);
                next.extend(
                    entries
                        .sitemaps
                        .into_iter()
                        .filter(|nested| seen.insert(nested.clone())),
                );
            }

            if depth == MAX_SITEMAP_DEPTH && !next.is_empty() {
                warn!(
                    "Sitemap nesting deeper than {} levels, skipping {} sitemaps",
                    MAX_SITEMAP_DEPTH,
                    next.len()
                );
                break;
            }

            depth += 1;
            level = next;
        }

        info!("Resolved {} URLs from {} sitemaps", pages.len(), seen.len());
        pages
    }

    async fn load(&self, url: String) -> SitemapEntries {
        match self.source.fetch(&url, self.timeout).await {
            Ok(page) if page.is_success() => {
                let entries = parse_sitemap(&page.body);
                debug!(
                    "Sitemap {}: {} pages, {} nested",
                    url,
                    entries.pages.len(),
                    entries.sitemaps.len()
                );
                entries
            }
            Ok(page) => {
                warn!("Failed to fetch sitemap {}: HTTP {}", url, page.status);
                SitemapEntries::default()
            }
            Err(e) => {
                warn!("Failed to fetch sitemap {}: {}", url, e);
                SitemapEntries::default()
            }
        }
    }
}
