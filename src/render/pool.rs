//! Bounded pool of rendering sessions

use super::{FetchError, PageSource, RenderContext, RenderOptions};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, warn};

/// Hands out at most `slots` concurrent [`RenderSession`]s
///
/// Cloning is cheap and clones share the same slots.
#[derive(Clone)]
pub struct RenderPool {
    source: Arc<dyn PageSource>,
    slots: Arc<Semaphore>,
    options: Arc<RenderOptions>,
    retries: u32,
}

impl RenderPool {
    /// Creates a pool over `source`
    ///
    /// A `slots` value of zero is raised to one.
    pub fn new(source: Arc<dyn PageSource>, slots: usize, options: RenderOptions) -> Self {
        Self {
            source,
            slots: Arc::new(Semaphore::new(slots.max(1))),
            options: Arc::new(options),
            retries: 0,
        }
    }

    /// Extra attempts after a failed render
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Number of sessions that could be acquired right now
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Waits for a free slot and returns a session bound to it
    ///
    /// The session owns its own source context, if the source has one.
    /// Both the context and the slot are released when the session is
    /// dropped.
    pub async fn session(&self) -> Result<RenderSession, FetchError> {
        let permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| FetchError::PoolClosed)?;
        let context = self.source.open_context().await?;

        Ok(RenderSession {
            source: Arc::clone(&self.source),
            context,
            options: Arc::clone(&self.options),
            _permit: permit,
        })
    }

    /// Renders `url` in a fresh session, retrying up to the configured count
    ///
    /// Each attempt acquires its own session, so a failing page never holds
    /// a slot while it waits for the next attempt.
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            let result = {
                let session = self.session().await?;
                session.render(url).await
            };

            match result {
                Ok(html) => return Ok(html),
                Err(FetchError::PoolClosed) => return Err(FetchError::PoolClosed),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    debug!("Render of {} failed ({}), attempt {}", url, e, attempt + 1);
                }
                Err(e) => {
                    warn!("Render of {} failed: {}", url, e);
                    return Err(e);
                }
            }
        }
    }
}

/// An isolated rendering context holding one pool slot
pub struct RenderSession {
    source: Arc<dyn PageSource>,
    context: Option<Box<dyn RenderContext>>,
    options: Arc<RenderOptions>,
    _permit: OwnedSemaphorePermit,
}

impl RenderSession {
    /// Renders a page, bounded by the pool's timeout
    pub async fn render(&self, url: &str) -> Result<String, FetchError> {
        let render = async {
            match &self.context {
                Some(context) => context.render(url, &self.options).await,
                None => self.source.render(url, &self.options).await,
            }
        };

        tokio::time::timeout(self.options.timeout, render)
            .await
            .map_err(|_| FetchError::timeout(url, self.options.timeout))?
    }
}
