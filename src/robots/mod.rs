//! Robots.txt handling module
//!
//! Fetches `/robots.txt` for the audited site and decides whether a URL is
//! indexable. An unreachable or unparsable file never fails the run; it
//! just means nothing is disallowed.

mod parser;

pub use parser::{is_disallowed, RobotsRules};

use crate::render::PageSource;
use crate::url::path_of;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Fetches and parses robots.txt for the site rooted at `root`
///
/// Any failure (network error, timeout, non-2xx status) yields
/// [`RobotsRules::empty`].
pub async fn fetch_robots(source: &dyn PageSource, root: &Url, timeout: Duration) -> RobotsRules {
    let robots_url = match root.join("/robots.txt") {
        Ok(url) => url,
        Err(e) => {
            debug!("Cannot build robots.txt URL for {}: {}", root, e);
            return RobotsRules::empty();
        }
    };

    match source.fetch(robots_url.as_str(), timeout).await {
        Ok(page) if page.is_success() => {
            let rules = RobotsRules::parse(&page.body);
            info!(
                "robots.txt: {} disallow rules, {} sitemaps",
                rules.disallow.len(),
                rules.sitemaps.len()
            );
            rules
        }
        Ok(page) => {
            debug!("robots.txt returned HTTP {}, treating as empty", page.status);
            RobotsRules::empty()
        }
        Err(e) => {
            debug!("robots.txt unavailable ({}), treating as empty", e);
            RobotsRules::empty()
        }
    }
}

/// Indexability decisions for one site
#[derive(Debug, Clone)]
pub struct RobotsClassifier {
    rules: RobotsRules,
    agent: Option<String>,
}

impl RobotsClassifier {
    /// Applies every `Disallow` rule to every URL
    pub fn global(rules: RobotsRules) -> Self {
        Self { rules, agent: None }
    }

    /// Evaluates rules as seen by `agent` only
    pub fn per_agent(rules: RobotsRules, agent: &str) -> Self {
        Self {
            rules,
            agent: Some(agent.to_string()),
        }
    }

    pub fn rules(&self) -> &RobotsRules {
        &self.rules
    }

    /// Returns true when `url` must be marked non-indexed
    pub fn is_disallowed_url(&self, url: &str) -> bool {
        match &self.agent {
            Some(agent) => self.rules.disallows_for_agent(url, agent),
            None => self.rules.disallows(&path_of(url)),
        }
    }
}
