use super::UrlStatus;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Every field a record can report, besides the URL itself
pub const FIELD_NAMES: [&str; 11] = [
    "status",
    "title",
    "description",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "internal_link_count",
    "incoming_link_count",
];

/// Heading tallies for levels h1 through h6
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadingCounts([u32; 6]);

impl HeadingCounts {
    pub fn new(counts: [u32; 6]) -> Self {
        Self(counts)
    }

    /// Count for `level` (1..=6), zero for any other level
    pub fn get(&self, level: usize) -> u32 {
        match level {
            1..=6 => self.0[level - 1],
            _ => 0,
        }
    }

    /// Adds one heading of `level`; other levels are ignored
    pub fn increment(&mut self, level: usize) {
        if (1..=6).contains(&level) {
            self.0[level - 1] += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// `(level, count)` pairs in level order
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0.iter().enumerate().map(|(i, count)| (i + 1, *count))
    }

    pub fn as_array(&self) -> [u32; 6] {
        self.0
    }
}

/// Everything known about one URL of the audited site
///
/// Discovery creates the record with a status only. Extraction fills in
/// the page metadata and the link graph sets `incoming_link_count` last.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// Normalized absolute URL, unique per site
    pub url: String,

    pub status: UrlStatus,

    /// Page `<title>`, `None` when missing or blank
    pub title: Option<String>,

    /// `<meta name="description">` content, `None` when missing or blank
    pub description: Option<String>,

    /// Heading counts after boilerplate pruning, `None` until extracted
    pub headings: Option<HeadingCounts>,

    /// Normalized, deduplicated same-origin link targets, sorted
    pub internal_links: Vec<String>,

    /// Number of extracted pages linking here, `None` until the graph runs
    pub incoming_link_count: Option<u32>,

    /// When metadata was last extracted
    pub extracted_at: Option<DateTime<Utc>>,
}

impl UrlRecord {
    /// A freshly discovered URL with no metadata
    pub fn discovered(url: impl Into<String>, status: UrlStatus) -> Self {
        Self {
            url: url.into(),
            status,
            title: None,
            description: None,
            headings: None,
            internal_links: Vec::new(),
            incoming_link_count: None,
            extracted_at: None,
        }
    }

    /// Returns true once page metadata has been extracted
    pub fn is_extracted(&self) -> bool {
        self.extracted_at.is_some()
    }

    /// Number of distinct internal links, `None` until extracted
    pub fn internal_link_count(&self) -> Option<usize> {
        self.is_extracted().then(|| self.internal_links.len())
    }

    /// Field name to rendered value, for every field this record carries
    ///
    /// `status` is always present. Keys are drawn from [`FIELD_NAMES`].
    pub fn present_fields(&self) -> BTreeMap<&'static str, String> {
        let mut fields = BTreeMap::new();
        fields.insert("status", self.status.to_string());

        if let Some(title) = &self.title {
            fields.insert("title", title.clone());
        }
        if let Some(description) = &self.description {
            fields.insert("description", description.clone());
        }
        if let Some(headings) = &self.headings {
            for (level, count) in headings.iter() {
                fields.insert(FIELD_NAMES[2 + level], count.to_string());
            }
        }
        if let Some(count) = self.internal_link_count() {
            fields.insert("internal_link_count", count.to_string());
        }
        if let Some(count) = self.incoming_link_count {
            fields.insert("incoming_link_count", count.to_string());
        }

        fields
    }
}
