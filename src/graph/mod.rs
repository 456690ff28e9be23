//! Link Graph Builder
//!
//! Folds the outbound internal links of every extracted page into incoming
//! link counts per target URL.

use crate::state::UrlRecord;
use std::collections::HashMap;

/// Incoming link count per URL
///
/// URLs that nothing links to are absent and read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    incoming: HashMap<String, u32>,
}

impl LinkGraph {
    /// Builds the graph from extraction output
    ///
    /// Each record contributes one count to every distinct URL in its
    /// `internal_links`, including a link to itself. The result does not
    /// depend on record order.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a UrlRecord>,
    {
        let mut graph = Self::default();
        for record in records {
            graph.add_page(&record.internal_links);
        }
        graph
    }

    /// Adds the outbound links of one page
    ///
    /// Duplicate targets within `links` are counted once.
    pub fn add_page<S: AsRef<str>>(&mut self, links: &[S]) {
        let mut seen = std::collections::HashSet::new();
        for link in links {
            let link = link.as_ref();
            if seen.insert(link) {
                *self.incoming.entry(link.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Incoming count for `url`, zero when unlinked
    pub fn incoming(&self, url: &str) -> u32 {
        self.incoming.get(url).copied().unwrap_or(0)
    }

    /// Number of distinct link targets
    pub fn len(&self) -> usize {
        self.incoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.incoming.iter().map(|(url, count)| (url.as_str(), *count))
    }

    /// Sets `incoming_link_count` on every record
    pub fn apply<'a, I>(&self, records: I)
    where
        I: IntoIterator<Item = &'a mut UrlRecord>,
    {
        for record in records {
            record.incoming_link_count = Some(self.incoming(&record.url));
        }
    }
}
