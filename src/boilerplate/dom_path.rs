//! Navigational-Pattern Detector
//!
//! An anchor's DOM path is the chain of tag names from the document root
//! down to the `<a>` itself, e.g. `html > body > nav > ul > li > a`. Paths
//! that carry same-origin links on most sampled pages are navigation.

use super::MIN_OBSERVED_PAGES;
use crate::url::{is_same_origin, resolve_link};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeSet, HashMap, HashSet};
use url::Url;

const SEPARATOR: &str = " > ";

/// Root-to-element tag chain of `element`
pub fn dom_path(element: ElementRef<'_>) -> String {
    let mut tags: Vec<&str> = element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|ancestor| ancestor.value().name())
        .collect();
    tags.reverse();
    tags.push(element.value().name());
    tags.join(SEPARATOR)
}

/// Returns true when `anchor` has an href pointing at the same origin as `root`
pub fn is_internal_anchor(anchor: ElementRef<'_>, page_url: &Url, root: &Url) -> bool {
    anchor
        .value()
        .attr("href")
        .and_then(|href| resolve_link(href, page_url))
        .map_or(false, |target| is_same_origin(&target, root))
}

/// Distinct DOM paths of the same-origin anchors of one document
pub fn anchor_paths(document: &Html, page_url: &Url, root: &Url) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    if let Ok(selector) = Selector::parse("a[href]") {
        for anchor in document.root_element().select(&selector) {
            if is_internal_anchor(anchor, page_url, root) {
                paths.insert(dom_path(anchor));
            }
        }
    }
    paths
}

/// Per-path page counts gathered while sampling
#[derive(Debug, Clone, Default)]
pub struct NavPathTable {
    counts: HashMap<String, usize>,
    pages_observed: usize,
}

impl NavPathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the anchor paths of one page
    ///
    /// A path that occurs several times on the page is counted once.
    pub fn observe<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: HashSet<String> = paths.into_iter().map(Into::into).collect();
        for path in distinct {
            *self.counts.entry(path).or_insert(0) += 1;
        }
        self.pages_observed += 1;
    }

    /// Records the same-origin anchor paths of a parsed page
    pub fn observe_document(&mut self, document: &Html, page_url: &Url, root: &Url) {
        self.observe(anchor_paths(document, page_url, root));
    }

    pub fn pages_observed(&self) -> usize {
        self.pages_observed
    }

    /// Number of pages on which `path` was seen
    pub fn count(&self, path: &str) -> usize {
        self.counts.get(path).copied().unwrap_or(0)
    }

    /// Fraction of observed pages carrying `path`, zero before any page
    pub fn frequency(&self, path: &str) -> f64 {
        if self.pages_observed == 0 {
            return 0.0;
        }
        self.count(path) as f64 / self.pages_observed as f64
    }

    /// Keeps every path whose frequency reaches `threshold`
    ///
    /// Fewer than [`MIN_OBSERVED_PAGES`] pages give no patterns.
    pub fn freeze(self, threshold: f64) -> NavigationalPatterns {
        if self.pages_observed < MIN_OBSERVED_PAGES {
            return NavigationalPatterns::default();
        }
        let paths = self
            .counts
            .keys()
            .filter(|path| self.frequency(path) >= threshold)
            .cloned()
            .collect();
        NavigationalPatterns { paths }
    }
}

/// Frozen set of navigational DOM paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationalPatterns {
    paths: HashSet<String>,
}

impl NavigationalPatterns {
    pub fn is_navigational(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Classifies an anchor element by its DOM path
    pub fn is_navigational_anchor(&self, anchor: ElementRef<'_>) -> bool {
        !self.paths.is_empty() && self.is_navigational(&dom_path(anchor))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
