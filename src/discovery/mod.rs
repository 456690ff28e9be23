//! URL Discovery
//!
//! Builds the URL status map of a site from three sources:
//!
//! - the sitemap(s): `<root><sitemap-path>` plus any `Sitemap:` line of
//!   robots.txt
//! - a breadth-first crawl from the root
//! - robots.txt `Disallow` rules
//!
//! Only a sitemap URL that robots.txt allows is `Indexed`. Everything else,
//! including URLs found only by crawling, is `NonIndexed`.

mod frontier;
mod sitemap;

pub use frontier::{same_origin_links, CrawlLimits, FrontierCrawler};
pub use sitemap::{parse_sitemap, SitemapEntries, SitemapResolver, MAX_SITEMAP_DEPTH};

use crate::config::Config;
use crate::render::PageSource;
use crate::robots::{fetch_robots, RobotsClassifier};
use crate::state::UrlStatus;
use crate::url::normalize_internal;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Counts describing one discovery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Distinct normalized URLs taken from sitemaps
    pub sitemap_urls: usize,
    /// URLs visited by the crawler
    pub crawled_urls: usize,
    pub indexed: usize,
    pub non_indexed: usize,
}

impl DiscoveryReport {
    pub fn total(&self) -> usize {
        self.indexed + self.non_indexed
    }
}

/// Result of [`discover`]
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub statuses: BTreeMap<String, UrlStatus>,
    pub report: DiscoveryReport,
}

/// Normalizes raw sitemap `<loc>` values, dropping URLs outside the site
///
/// "Outside" uses the same origin rule as the crawl and extraction, so a
/// `www.` sibling host is dropped here too.
pub fn normalize_sitemap_urls(
    root: &Url,
    locs: &BTreeSet<String>,
    max_segments: usize,
) -> BTreeSet<String> {
    locs.iter()
        .filter_map(|loc| {
            let normalized = Url::parse(loc.trim())
                .ok()
                .and_then(|url| normalize_internal(&url, root, max_segments));
            if normalized.is_none() {
                debug!("Dropping sitemap entry {}", loc);
            }
            normalized
        })
        .collect()
}

/// Merges sitemap and crawl output into the status map
///
/// Both inputs must already be normalized. A sitemap URL is `Indexed`
/// unless robots.txt disallows it; a URL only the crawl found is always
/// `NonIndexed`.
pub fn merge_statuses(
    sitemap: &BTreeSet<String>,
    crawled: &BTreeSet<String>,
    robots: &RobotsClassifier,
) -> BTreeMap<String, UrlStatus> {
    let mut statuses: BTreeMap<String, UrlStatus> = sitemap
        .iter()
        .map(|url| {
            let status = if robots.is_disallowed_url(url) {
                UrlStatus::NonIndexed
            } else {
                UrlStatus::Indexed
            };
            (url.clone(), status)
        })
        .collect();

    for url in crawled {
        statuses
            .entry(url.clone())
            .or_insert(UrlStatus::NonIndexed);
    }

    statuses
}

/// Root sitemap URLs: the configured path plus robots.txt declarations
fn sitemap_roots(root: &Url, config: &Config, declared: &[String]) -> Vec<String> {
    let mut roots = Vec::new();
    if let Ok(url) = root.join(&config.discovery.sitemap_path) {
        roots.push(url.to_string());
    }
    for entry in declared {
        if let Ok(url) = root.join(entry) {
            let url = url.to_string();
            if !roots.contains(&url) {
                roots.push(url);
            }
        }
    }
    roots
}

/// Runs sitemap resolution, robots classification and the crawl
///
/// Never fails: unreachable sitemaps, robots.txt or pages only shrink the
/// result.
pub async fn discover(source: &dyn PageSource, root: &Url, config: &Config) -> Discovery {
    let timeout = Duration::from_millis(config.http.timeout_ms);
    let max_segments = config.discovery.max_path_segments;

    let rules = fetch_robots(source, root, timeout).await;
    let roots = sitemap_roots(root, config, &rules.sitemaps);
    let classifier = if config.robots.per_agent {
        RobotsClassifier::per_agent(rules, &config.user_agent.crawler_name)
    } else {
        RobotsClassifier::global(rules)
    };

    let resolver = SitemapResolver::new(source, timeout, config.discovery.sitemap_fan_out);
    let crawler = FrontierCrawler::new(
        source,
        root.clone(),
        CrawlLimits {
            page_cap: config.discovery.page_cap,
            batch_width: config.discovery.batch_width,
            max_path_segments: max_segments,
            timeout,
        },
    );

    let (locs, crawled) = tokio::join!(resolver.resolve(&roots), crawler.crawl());

    let sitemap = normalize_sitemap_urls(root, &locs, max_segments);
    let statuses = merge_statuses(&sitemap, &crawled, &classifier);

    let indexed = statuses.values().filter(|s| s.is_indexed()).count();
    let report = DiscoveryReport {
        sitemap_urls: sitemap.len(),
        crawled_urls: crawled.len(),
        indexed,
        non_indexed: statuses.len() - indexed,
    };

    info!(
        "Discovery: {} URLs ({} indexed, {} non-indexed) from {} sitemap URLs and {} crawled pages",
        report.total(),
        report.indexed,
        report.non_indexed,
        report.sitemap_urls,
        report.crawled_urls
    );

    Discovery { statuses, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robots::RobotsRules;

    fn set(urls: &[&str]) -> BTreeSet<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    fn root() -> Url {
        Url::parse("https://www.example.com/").unwrap()
    }

    #[test]
    fn test_normalize_sitemap_urls() {
        let locs = set(&[
            "https://www.example.com/a/",
            "https://www.example.com/a?utm=1",
            "http://www.example.com/d",
            "https://example.com/b",
            "https://elsewhere.org/c",
            "not a url",
        ]);
        assert_eq!(
            normalize_sitemap_urls(&root(), &locs, 5),
            set(&["https://www.example.com/a", "https://www.example.com/d"])
        );
    }

    #[test]
    fn test_robots_dominates_sitemap() {
        let robots = RobotsClassifier::global(RobotsRules::parse("User-agent: *\nDisallow: /private/"));
        let sitemap = set(&["https://e.com/about", "https://e.com/private/x"]);
        let crawled = set(&["https://e.com/private/x", "https://e.com/about"]);

        let statuses = merge_statuses(&sitemap, &crawled, &robots);
        assert_eq!(statuses["https://e.com/about"], UrlStatus::Indexed);
        assert_eq!(statuses["https://e.com/private/x"], UrlStatus::NonIndexed);
    }

    #[test]
    fn test_crawl_only_is_non_indexed() {
        let robots = RobotsClassifier::global(RobotsRules::empty());
        let statuses = merge_statuses(&set(&["https://e.com/a"]), &set(&["https://e.com/b"]), &robots);

        assert_eq!(statuses["https://e.com/a"], UrlStatus::Indexed);
        assert_eq!(statuses["https://e.com/b"], UrlStatus::NonIndexed);
    }

    #[test]
    fn test_scenario_counts() {
        let robots = RobotsClassifier::global(RobotsRules::parse("Disallow: /private"));
        let sitemap = set(&["https://e.com", "https://e.com/about", "https://e.com/private/x"]);
        let crawled = set(&["https://e.com", "https://e.com/about", "https://e.com/extra"]);

        let statuses = merge_statuses(&sitemap, &crawled, &robots);
        let indexed = statuses.values().filter(|s| s.is_indexed()).count();
        assert_eq!(statuses.len(), 4);
        assert_eq!(indexed, 2);
        assert_eq!(statuses["https://e.com/extra"], UrlStatus::NonIndexed);
    }

    #[test]
    fn test_sitemap_roots_include_robots_declarations() {
        let config = crate::config::parse_config(
            r#"
[site]
root-url = "https://example.com"
[user-agent]
crawler-name = "Sitegauge"
crawler-version = "0.1"
[output]
database-path = "x.db"
"#,
        )
        .unwrap();
        let root = Url::parse("https://example.com/").unwrap();

        let roots = sitemap_roots(
            &root,
            &config,
            &[
                "https://example.com/sitemap.xml".to_string(),
                "/news-sitemap.xml".to_string(),
            ],
        );
        assert_eq!(
            roots,
            vec![
                "https://example.com/sitemap.xml".to_string(),
                "https://example.com/news-sitemap.xml".to_string(),
            ]
        );
    }
}
