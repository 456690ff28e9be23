//! Robots.txt parser implementation
//!
//! The default interpretation is deliberately simple: every `Disallow:` line
//! in the file applies to every crawler, regardless of the `User-agent` group
//! it sits in. Agent-aware matching is delegated to the robotstxt crate.

use robotstxt::DefaultMatcher;

/// Rules extracted from a robots.txt file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    /// Every non-empty `Disallow:` value, in file order
    pub disallow: Vec<String>,
    /// Every `Sitemap:` URL declared in the file
    pub sitemaps: Vec<String>,
    /// Raw robots.txt content, kept for agent-aware matching
    content: String,
}

impl RobotsRules {
    /// Parses raw robots.txt content
    ///
    /// Directive names are matched case-insensitively. Comments after `#`
    /// are ignored. Lines that are not `key: value` pairs are skipped, so
    /// garbage input yields an empty rule set.
    pub fn parse(content: &str) -> Self {
        let mut disallow = Vec::new();
        let mut sitemaps = Vec::new();

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_ascii_lowercase().as_str() {
                "disallow" if !value.is_empty() => disallow.push(value.to_string()),
                "sitemap" if !value.is_empty() => sitemaps.push(value.to_string()),
                _ => {}
            }
        }

        Self {
            disallow,
            sitemaps,
            content: content.to_string(),
        }
    }

    /// An empty rule set, used whenever robots.txt is unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when no rule disallows anything
    pub fn is_empty(&self) -> bool {
        self.disallow.is_empty()
    }

    /// Global prefix check against every `Disallow` rule
    pub fn disallows(&self, path: &str) -> bool {
        is_disallowed(path, &self.disallow)
    }

    /// Agent-aware check using the robotstxt matcher
    ///
    /// `url` should be absolute. With no content everything is allowed.
    pub fn disallows_for_agent(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return false;
        }

        let mut matcher = DefaultMatcher::default();
        !matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }
}

/// Returns true when `path` starts with any rule
///
/// Each rule's trailing slash is stripped before matching, so `Disallow: /`
/// blocks the entire site and `Disallow: /private/` also blocks `/private`.
pub fn is_disallowed(path: &str, rules: &[String]) -> bool {
    rules
        .iter()
        .any(|rule| path.starts_with(rule.trim_end_matches('/')))
}
