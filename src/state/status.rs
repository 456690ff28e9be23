/// Indexability status definitions
use std::fmt;

/// Whether the site owner intends a URL to be crawlable
///
/// Only a sitemap entry that robots.txt does not disallow is `Indexed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrlStatus {
    /// Listed in the sitemap and allowed by robots.txt
    Indexed,

    /// Disallowed by robots.txt, or only reachable by crawling
    NonIndexed,
}

impl UrlStatus {
    /// Returns true for `Indexed`
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed)
    }

    /// Combines two observations of the same URL
    ///
    /// `NonIndexed` always wins, so once a stricter rule has demoted a URL
    /// it can never be promoted back.
    pub fn merge(self, other: Self) -> Self {
        if self == Self::NonIndexed || other == Self::NonIndexed {
            Self::NonIndexed
        } else {
            Self::Indexed
        }
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::NonIndexed => "non-indexed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "indexed" => Some(Self::Indexed),
            "non-indexed" => Some(Self::NonIndexed),
            _ => None,
        }
    }

    /// Returns all statuses
    pub fn all() -> [Self; 2] {
        [Self::Indexed, Self::NonIndexed]
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}
