use crate::UrlError;
use url::Url;

/// Default number of path segments kept by [`normalize_url`]
pub const DEFAULT_MAX_PATH_SEGMENTS: usize = 5;

/// Normalizes a URL into the key form used throughout Sitegauge
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Lowercase the host (keeping `www.` and any explicit port)
/// 3. Drop the query string and fragment
/// 4. Drop empty path segments (duplicate or trailing slashes)
/// 5. Keep at most `DEFAULT_MAX_PATH_SEGMENTS` segments
/// 6. Render as `scheme://host[:port]` followed by `/seg/seg`, with no
///    trailing slash, so the site root becomes `https://host`
///
/// The result parses back to itself, which makes normalization idempotent.
///
/// # Examples
///
/// ```
/// use sitegauge::url::normalize_url;
///
/// let url = normalize_url("https://Example.com/blog/post/?page=2#top").unwrap();
/// assert_eq!(url, "https://example.com/blog/post");
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, UrlError> {
    normalize_url_capped(url_str, DEFAULT_MAX_PATH_SEGMENTS)
}

/// Like [`normalize_url`] with an explicit path segment cap
pub fn normalize_url_capped(url_str: &str, max_segments: usize) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(&url, max_segments)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(url: &Url, max_segments: usize) -> Result<String, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();

    let mut normalized = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }

    for segment in url
        .path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .take(max_segments)
    {
        normalized.push('/');
        normalized.push_str(segment);
    }

    Ok(normalized)
}
