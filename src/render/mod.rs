//! HTTP/render collaborator
//!
//! Everything that touches the network goes through [`PageSource`]: plain
//! fetches (robots.txt, sitemaps, crawl pages) and full page renders for
//! extraction. Renders are additionally gated by a [`RenderPool`], which
//! hands out one isolated [`RenderSession`] per task. Sources that keep
//! per-session state (a browser context, for the headless Chrome source
//! behind the `browser` feature) open it through [`PageSource::open_context`].

#[cfg(feature = "browser")]
mod browser;
mod http;
mod pool;

#[cfg(feature = "browser")]
pub use browser::BrowserPageSource;
pub use http::{build_http_client, HttpPageSource};
pub use pool::{RenderPool, RenderSession};

use crate::config::ResourceKind;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Per-request failure
///
/// Callers in the discovery and extraction paths log these and drop the URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Render pool is closed")]
    PoolClosed,

    #[error("Browser unavailable: {0}")]
    Browser(String),
}

impl FetchError {
    /// Builds the error for an elapsed timeout
    pub fn timeout(url: &str, timeout: Duration) -> Self {
        Self::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

/// Result of a plain HTTP fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

impl FetchedPage {
    /// Returns true for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Options passed to every render
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Upper bound for the whole render
    pub timeout: Duration,
    /// Subresource kinds the renderer may skip
    pub block: Vec<ResourceKind>,
}

impl RenderOptions {
    pub fn new(timeout: Duration, block: Vec<ResourceKind>) -> Self {
        Self { timeout, block }
    }

    /// Returns true when `kind` may be skipped
    pub fn blocks(&self, kind: ResourceKind) -> bool {
        self.block.contains(&kind)
    }
}

/// Source of page content
///
/// Implementations must be usable from many tasks at once. Each call is
/// independent, so no state is shared between two concurrent renders.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Plain HTTP GET. Any status is returned as `Ok`; only transport
    /// failures and timeouts are errors.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError>;

    /// Loads a page to a content-ready state and returns its markup.
    /// Non-2xx responses are errors.
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, FetchError>;

    /// Opens the isolated context backing one [`RenderSession`]
    ///
    /// Sources without per-session state return `None`, and the session
    /// renders through [`PageSource::render`].
    async fn open_context(&self) -> Result<Option<Box<dyn RenderContext>>, FetchError> {
        Ok(None)
    }
}

/// Rendering state owned by a single session
///
/// Dropping the context releases whatever the source allocated for it.
#[async_trait]
pub trait RenderContext: Send + Sync {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, FetchError>;
}
