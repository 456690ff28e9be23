//! Metadata Extractor
//!
//! Turns one rendered page into title, description, heading counts and the
//! internal link set. Boilerplate is pruned first, so headings and links
//! inside recurring blocks are not counted.

use crate::boilerplate::BoilerplateFilter;
use crate::state::{HeadingCounts, UrlRecord, UrlStatus};
use crate::url::{is_same_origin, normalize_internal, resolve_link};
use chrono::Utc;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Metadata extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub headings: HeadingCounts,
    /// Normalized same-origin link targets, sorted and deduplicated
    pub internal_links: Vec<String>,
    /// Body blocks removed as boilerplate
    pub pruned_blocks: usize,
    /// Anchors skipped for sitting on a navigational DOM path
    pub skipped_nav_links: usize,
}

impl PageMetadata {
    /// Builds the stored record for `url`, stamped with the current time
    pub fn into_record(self, url: impl Into<String>, status: UrlStatus) -> UrlRecord {
        UrlRecord {
            title: self.title,
            description: self.description,
            headings: Some(self.headings),
            internal_links: self.internal_links,
            extracted_at: Some(Utc::now()),
            ..UrlRecord::discovered(url, status)
        }
    }
}

/// Extracts metadata from rendered `html`
///
/// Every selection starts at the root element. Pruned blocks are detached
/// but stay in the node arena, and `Html::select` would still reach their
/// descendants.
///
/// `page_url` resolves relative links; `root` decides what counts as
/// internal. Link targets are normalized with at most `max_segments` path
/// segments so they match discovery's URL keys.
pub fn extract_metadata(
    html: &str,
    page_url: &Url,
    root: &Url,
    filter: &BoilerplateFilter,
    max_segments: usize,
) -> PageMetadata {
    let mut document = Html::parse_document(html);
    let pruned_blocks = filter.prune(&mut document);

    let (internal_links, skipped_nav_links) =
        internal_links(&document, page_url, root, filter, max_segments);

    PageMetadata {
        title: extract_title(&document),
        description: extract_description(&document),
        headings: count_headings(&document),
        internal_links,
        pruned_blocks,
        skipped_nav_links,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .root_element()
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// First `<meta name="description">`, name matched case-insensitively
fn extract_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name][content]").ok()?;

    document
        .root_element()
        .select(&selector)
        .find(|meta| {
            meta.value()
                .attr("name")
                .map_or(false, |name| name.trim().eq_ignore_ascii_case("description"))
        })
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn count_headings(document: &Html) -> HeadingCounts {
    let mut counts = HeadingCounts::default();
    for level in 1..=6 {
        if let Ok(selector) = Selector::parse(&format!("h{}", level)) {
            for _ in document.root_element().select(&selector) {
                counts.increment(level);
            }
        }
    }
    counts
}

/// Returns the sorted internal link set and the number of navigational
/// anchors skipped
fn internal_links(
    document: &Html,
    page_url: &Url,
    root: &Url,
    filter: &BoilerplateFilter,
    max_segments: usize,
) -> (Vec<String>, usize) {
    let mut links = BTreeSet::new();
    let mut skipped = 0;

    let Ok(selector) = Selector::parse("a[href]") else {
        return (Vec::new(), 0);
    };

    for anchor in document.root_element().select(&selector) {
        let Some(target) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, page_url))
        else {
            continue;
        };
        if !is_same_origin(&target, root) {
            continue;
        }
        if filter.is_navigational_anchor(anchor) {
            skipped += 1;
            continue;
        }
        if let Some(normalized) = normalize_internal(&target, root, max_segments) {
            links.insert(normalized);
        }
    }

    (links.into_iter().collect(), skipped)
}
