use crate::UrlError;
use url::Url;

/// Extracts the lowercase host from a URL
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Derives the storage namespace for a website
///
/// The key is the hostname with a single leading `www.` label removed. Both
/// full URLs and bare domain strings are accepted, and the result depends on
/// nothing but the input.
///
/// # Examples
///
/// ```
/// use sitegauge::url::site_key;
///
/// assert_eq!(site_key("https://www.example.com/about").unwrap(), "example.com");
/// assert_eq!(site_key("Docs.Example.com").unwrap(), "docs.example.com");
/// ```
pub fn site_key(domain: &str) -> Result<String, UrlError> {
    let trimmed = domain.trim();
    let url = match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some() => url,
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", trimmed))
                .map_err(|e| UrlError::Parse(e.to_string()))?
        }
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    let host = extract_domain(&url).ok_or(UrlError::MissingDomain)?;
    let key = host.strip_prefix("www.").unwrap_or(&host);

    if key.is_empty() {
        return Err(UrlError::MissingDomain);
    }

    Ok(key.to_string())
}
