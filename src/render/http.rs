//! reqwest-backed page source
//!
//! Plain HTTP never loads subresources, so the resource blocking hint in
//! [`RenderOptions`] is already satisfied and is not consulted here. Pages
//! that only produce content after running scripts will render as their
//! server-side markup.

use super::{FetchError, FetchedPage, PageSource, RenderOptions};
use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tracing::debug;

/// Builds an HTTP client with proper configuration
///
/// The client carries the configured User-Agent, follows up to 10
/// redirects and accepts gzip and brotli bodies. Per-request timeouts are
/// applied by the caller, `connect_timeout` only bounds connection setup.
///
/// # Example
///
/// ```no_run
/// use sitegauge::config::UserAgentConfig;
/// use sitegauge::render::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "Sitegauge".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: None,
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(connect_timeout)
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageSource`] over a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the user agent section
    pub fn from_config(
        config: &UserAgentConfig,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, connect_timeout)?))
    }

    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(FetchedPage { status, body })
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    let message = if error.is_connect() {
        "Connection refused".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        debug!("Fetching {}", url);
        tokio::time::timeout(timeout, self.get(url))
            .await
            .map_err(|_| FetchError::timeout(url, timeout))?
    }

    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, FetchError> {
        let page = self.fetch(url, options.timeout).await?;

        if !page.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: page.status,
            });
        }

        Ok(page.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: Some("https://example.com/about".to_string()),
        }
    }

    fn source() -> HttpPageSource {
        HttpPageSource::from_config(&create_test_config(), Duration::from_secs(5)).unwrap()
    }

    fn options(timeout_ms: u64) -> RenderOptions {
        RenderOptions::new(Duration::from_millis(timeout_ms), vec![ResourceKind::Image])
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&create_test_config(), Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .and(header(
                "user-agent",
                "TestCrawler/1.0 (+https://example.com/about)",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *"))
            .mount(&server)
            .await;

        let page = source()
            .fetch(&format!("{}/robots.txt", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "User-agent: *");
    }

    #[tokio::test]
    async fn test_fetch_returns_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let page = source()
            .fetch(&format!("{}/missing", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.status, 404);
        assert!(!page.is_success());
    }

    #[tokio::test]
    async fn test_render_rejects_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = source()
            .render(&format!("{}/boom", server.uri()), &options(5000))
            .await;

        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_render_returns_markup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body><h1>Hi</h1></body></html>"),
            )
            .mount(&server)
            .await;

        let html = source()
            .render(&format!("{}/page", server.uri()), &options(5000))
            .await
            .unwrap();

        assert!(html.contains("<h1>Hi</h1>"));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let result = source()
            .fetch(&format!("{}/slow", server.uri()), Duration::from_millis(100))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { timeout_ms: 100, .. })));
    }
}
