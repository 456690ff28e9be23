//! Headless Chrome page source
//!
//! Plain fetches (robots.txt, sitemaps, crawl pages) still go over reqwest.
//! Renders run in Chrome: the browser is launched on the first render
//! session, every session gets its own browser context, and subresources
//! the render options block are failed through the CDP Fetch domain before
//! they hit the network.
//!
//! The executable is taken from `CHROMIUM_PATH` when set, otherwise
//! chromiumoxide looks in the usual install locations.

use super::{FetchError, FetchedPage, HttpPageSource, PageSource, RenderContext, RenderOptions};
use crate::config::{ResourceKind, UserAgentConfig};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
    RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::Page;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Chrome and the task driving its CDP connection
struct LaunchedBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Drop for LaunchedBrowser {
    fn drop(&mut self) {
        debug!("Stopping browser handler task");
        self.handler.abort();
    }
}

/// [`PageSource`] that renders pages in headless Chrome
pub struct BrowserPageSource {
    http: HttpPageSource,
    user_agent: String,
    timeout: Duration,
    browser: OnceCell<Arc<LaunchedBrowser>>,
}

impl BrowserPageSource {
    /// Builds the source; Chrome itself is not started until the first
    /// render session opens
    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = HttpPageSource::from_config(config, timeout)?;

        Ok(Self {
            http,
            user_agent: config.header_value(),
            timeout,
            browser: OnceCell::new(),
        })
    }

    async fn browser(&self) -> Result<Arc<LaunchedBrowser>, FetchError> {
        self.browser
            .get_or_try_init(|| launch(&self.user_agent, self.timeout))
            .await
            .map(Arc::clone)
    }
}

async fn launch(user_agent: &str, timeout: Duration) -> Result<Arc<LaunchedBrowser>, FetchError> {
    let mut builder = BrowserConfig::builder()
        .request_timeout(timeout)
        .arg(format!("--user-agent={}", user_agent))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--mute-audio");

    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(FetchError::Browser)?;
    let (browser, mut events) = Browser::launch(config)
        .await
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    let handler = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            if let Err(e) = event {
                // chromiumoxide reports CDP messages it cannot decode here
                trace!("Browser handler error: {}", e);
            }
        }
        debug!("Browser handler task completed");
    });

    info!("Launched headless browser");
    Ok(Arc::new(LaunchedBrowser { browser, handler }))
}

#[async_trait]
impl PageSource for BrowserPageSource {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        self.http.fetch(url, timeout).await
    }

    /// Renders in a throwaway context
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, FetchError> {
        let context = BrowserSession::open(self.browser().await?).await?;
        context.render(url, options).await
    }

    async fn open_context(&self) -> Result<Option<Box<dyn RenderContext>>, FetchError> {
        let context = BrowserSession::open(self.browser().await?).await?;
        Ok(Some(Box::new(context)))
    }
}

/// One browser context; cookies and cache are not shared with other
/// sessions
struct BrowserSession {
    launched: Arc<LaunchedBrowser>,
    id: BrowserContextId,
}

impl BrowserSession {
    async fn open(launched: Arc<LaunchedBrowser>) -> Result<Self, FetchError> {
        let created = launched
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        let id = created.result.browser_context_id.clone();
        trace!("Opened browser context {:?}", id);

        Ok(Self { launched, id })
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let launched = Arc::clone(&self.launched);
        let id = self.id.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = launched
                    .browser
                    .execute(DisposeBrowserContextParams::new(id))
                    .await
                {
                    debug!("Failed to dispose browser context: {}", e);
                }
            });
        }
    }
}

#[async_trait]
impl RenderContext for BrowserSession {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<String, FetchError> {
        let failed = |e: chromiumoxide::error::CdpError| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.id.clone())
            .build()
            .map_err(FetchError::Browser)?;
        let page = self.launched.browser.new_page(target).await.map_err(failed)?;

        let result = load(&page, url, options).await;
        if let Err(e) = page.close().await {
            debug!("Failed to close page for {}: {}", url, e);
        }
        result
    }
}

/// Navigates `page` to `url` and returns the markup after the load event
async fn load(page: &Page, url: &str, options: &RenderOptions) -> Result<String, FetchError> {
    let failed = |e: chromiumoxide::error::CdpError| FetchError::Network {
        url: url.to_string(),
        message: e.to_string(),
    };

    let blocked = blocked_types(options);
    let interceptor = if blocked.is_empty() {
        None
    } else {
        Some(intercept(page, blocked).await.map_err(failed)?)
    };

    let mut responses = page
        .event_listener::<EventResponseReceived>()
        .await
        .map_err(failed)?;

    let navigated = async {
        page.goto(url).await?;
        page.wait_for_navigation().await?;
        page.content().await
    }
    .await;

    if let Some(interceptor) = interceptor {
        interceptor.abort();
    }
    let html = navigated.map_err(failed)?;

    // the document response arrives before the load event
    let mut status = None;
    while let Some(Some(event)) = responses.next().now_or_never() {
        if event.r#type == ResourceType::Document {
            status = Some(event.response.status);
            break;
        }
    }

    match status {
        Some(code) if !(200..300).contains(&code) => Err(FetchError::Status {
            url: url.to_string(),
            status: code as u16,
        }),
        Some(_) => Ok(html),
        None => {
            warn!("No document response seen for {}, keeping rendered markup", url);
            Ok(html)
        }
    }
}

/// Pauses every request on `page` and fails those of a blocked type
async fn intercept(
    page: &Page,
    blocked: Vec<ResourceType>,
) -> Result<JoinHandle<()>, chromiumoxide::error::CdpError> {
    let mut paused = page.event_listener::<EventRequestPaused>().await?;

    let pattern = RequestPattern::builder()
        .url_pattern("*")
        .request_stage(RequestStage::Request)
        .build();
    page.execute(EnableParams::builder().pattern(pattern).build())
        .await?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request = event.request_id.clone();
            let outcome = if blocked.contains(&event.resource_type) {
                trace!("Blocking {:?} {}", event.resource_type, event.request.url);
                page.execute(FailRequestParams::new(request, ErrorReason::BlockedByClient))
                    .await
                    .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(request))
                    .await
                    .map(|_| ())
            };

            if let Err(e) = outcome {
                trace!("Paused request was not resumed: {}", e);
            }
        }
    }))
}

fn blocked_types(options: &RenderOptions) -> Vec<ResourceType> {
    options.block.iter().copied().map(resource_type).collect()
}

/// CDP resource type for a configured resource kind
fn resource_type(kind: ResourceKind) -> ResourceType {
    match kind {
        ResourceKind::Image => ResourceType::Image,
        ResourceKind::Stylesheet => ResourceType::Stylesheet,
        ResourceKind::Font => ResourceType::Font,
        ResourceKind::Media => ResourceType::Media,
    }
}
