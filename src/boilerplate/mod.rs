//! Boilerplate detection
//!
//! Two detectors learn from the same page sample:
//!
//! - [`RepeatedBlockTable`]: body-level blocks found on every sampled page,
//!   pruned from the DOM before headings and links are counted
//! - [`NavPathTable`]: DOM paths that carry same-origin links on most
//!   sampled pages, used to drop navigational anchors from the link set
//!
//! [`BoilerplateMode`] picks which of them a [`BoilerplateFilter`] applies.
//! Learning always finishes and freezes before extraction starts.
//!
//! Both detectors need at least [`MIN_OBSERVED_PAGES`] pages. On a single
//! page everything is trivially "on every page", so a smaller sample
//! freezes to empty sets.

mod blocks;
mod dom_path;
mod sampler;

pub use blocks::{body_blocks, BlockSignature, RepeatedBlockTable, RepeatedSignatures};
pub use dom_path::{
    anchor_paths, dom_path, is_internal_anchor, NavPathTable, NavigationalPatterns,
};
pub use sampler::{choose_sample, sample_boilerplate};

use crate::config::BoilerplateMode;
use scraper::{ElementRef, Html};
use url::Url;

/// Fewest observed pages from which either detector classifies anything
pub const MIN_OBSERVED_PAGES: usize = 2;

/// Accumulates both detectors over sampled pages
#[derive(Debug, Clone)]
pub struct BoilerplateLearner {
    mode: BoilerplateMode,
    root: Url,
    blocks: RepeatedBlockTable,
    paths: NavPathTable,
}

impl BoilerplateLearner {
    pub fn new(mode: BoilerplateMode, root: Url) -> Self {
        Self {
            mode,
            root,
            blocks: RepeatedBlockTable::new(),
            paths: NavPathTable::new(),
        }
    }

    /// Feeds one rendered page to the detectors the mode uses
    pub fn observe(&mut self, html: &str, page_url: &Url) {
        if self.mode == BoilerplateMode::Off {
            return;
        }
        let document = Html::parse_document(html);
        if prunes_blocks(self.mode) {
            self.blocks.observe(&document);
        }
        if excludes_nav_links(self.mode) {
            self.paths.observe_document(&document, page_url, &self.root);
        }
    }

    /// Number of pages observed so far
    pub fn pages(&self) -> usize {
        self.blocks.pages().max(self.paths.pages_observed())
    }

    /// Freezes the learned sets
    pub fn freeze(self, nav_threshold: f64) -> BoilerplateFilter {
        BoilerplateFilter {
            mode: self.mode,
            repeated: self.blocks.freeze(),
            navigational: self.paths.freeze(nav_threshold),
        }
    }
}

/// Frozen boilerplate decisions, read-only during extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoilerplateFilter {
    mode: BoilerplateMode,
    repeated: RepeatedSignatures,
    navigational: NavigationalPatterns,
}

impl BoilerplateFilter {
    /// A filter that keeps everything
    pub fn disabled() -> Self {
        Self {
            mode: BoilerplateMode::Off,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> BoilerplateMode {
        self.mode
    }

    pub fn repeated(&self) -> &RepeatedSignatures {
        &self.repeated
    }

    pub fn navigational(&self) -> &NavigationalPatterns {
        &self.navigational
    }

    /// Removes repeated body blocks, returning how many were removed
    pub fn prune(&self, document: &mut Html) -> usize {
        if prunes_blocks(self.mode) {
            self.repeated.remove_repeated_blocks(document)
        } else {
            0
        }
    }

    /// Returns true when `anchor` sits on a navigational DOM path
    pub fn is_navigational_anchor(&self, anchor: ElementRef<'_>) -> bool {
        excludes_nav_links(self.mode) && self.navigational.is_navigational_anchor(anchor)
    }
}

fn prunes_blocks(mode: BoilerplateMode) -> bool {
    matches!(
        mode,
        BoilerplateMode::RepeatedBlocks | BoilerplateMode::Combined
    )
}

fn excludes_nav_links(mode: BoilerplateMode) -> bool {
    matches!(
        mode,
        BoilerplateMode::NavigationalPaths | BoilerplateMode::Combined
    )
}
