//! URL handling module for Sitegauge
//!
//! This module provides URL normalization, link resolution against a page,
//! same-origin checks and site key derivation.

mod domain;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, site_key};
pub use normalize::{
    normalize_parsed, normalize_url, normalize_url_capped, DEFAULT_MAX_PATH_SEGMENTS,
};

/// Resolves an `href` found on `base` into an absolute HTTP(S) URL
///
/// Empty hrefs, fragment-only anchors and `javascript:`, `mailto:`, `tel:`
/// and `data:` links resolve to `None`.
pub fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute)
        }
        _ => None,
    }
}

/// Returns true when both URLs share a host and explicit port
///
/// The scheme is not compared, so `http://` links on an `https://` site
/// still count as internal.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(ha), Some(hb)) => ha.eq_ignore_ascii_case(hb) && a.port() == b.port(),
        _ => false,
    }
}

/// Normalized key of `target` as a page of the site at `root`
///
/// `None` when `target` is on another origin or fails to normalize. A
/// same-origin URL takes the root's scheme, so `http://` and `https://`
/// spellings of one page share a key.
pub fn normalize_internal(target: &Url, root: &Url, max_segments: usize) -> Option<String> {
    if !is_same_origin(target, root) {
        return None;
    }
    if target.scheme() == root.scheme() {
        return normalize_parsed(target, max_segments).ok();
    }
    let mut aligned = target.clone();
    aligned.set_scheme(root.scheme()).ok()?;
    normalize_parsed(&aligned, max_segments).ok()
}

/// Path component used for robots matching, `/` when empty
pub fn path_of(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(url) if !url.path().is_empty() => url.path().to_string(),
        _ => "/".to_string(),
    }
}
