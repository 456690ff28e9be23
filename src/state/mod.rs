//! Per-URL audit state
//!
//! # Components
//!
//! - `UrlStatus`: indexability of a URL as decided by discovery
//! - `HeadingCounts`: h1..h6 tallies for one page
//! - `UrlRecord`: everything known about one URL of the site

mod record;
mod status;

// Re-export main types
pub use record::{HeadingCounts, UrlRecord, FIELD_NAMES};
pub use status::UrlStatus;
