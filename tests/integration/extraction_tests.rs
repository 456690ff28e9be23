//! Boilerplate sampling and metadata extraction against a mock site

use crate::common::{mount_html, site_url};
use sitegauge::boilerplate::sample_boilerplate;
use sitegauge::config::{BoilerplateMode, ExtractionConfig, UserAgentConfig};
use sitegauge::extraction::{Extraction, ExtractionCoordinator};
use sitegauge::render::{HttpPageSource, RenderOptions, RenderPool};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::MockServer;

const NAV: &str = r#"<nav class="site-nav">
    <h2>Sections</h2>
    <ul>
        <li><a href="/">Home</a></li>
        <li><a href="/page-0">First</a></li>
        <li><a href="/contact">Contact</a></li>
    </ul>
</nav>"#;

/// Page `i` of five: shared nav, content of a different shape on each page
///
/// Pages 0 and 2 link to the page after them from their content.
fn article(i: usize) -> String {
    let paragraphs = "<p>Lorem ipsum.</p>".repeat(i + 1);
    let link = if i == 0 || i == 2 {
        format!(r#"<a href="/page-{}">next</a>"#, i + 1)
    } else {
        String::new()
    };
    format!(
        r#"<html><head><title>Page {0}</title><meta name="description" content="About page {0}"></head>
<body>{1}<main><h1>Page {0}</h1><h2>Details</h2>{2}{3}</main></body></html>"#,
        i, NAV, paragraphs, link
    )
}

async fn five_page_site() -> (MockServer, Vec<String>) {
    let server = MockServer::start().await;
    let mut urls = Vec::new();
    for i in 0..5 {
        let route = format!("/page-{}", i);
        mount_html(&server, &route, article(i)).await;
        urls.push(site_url(&server, &route));
    }
    (server, urls)
}

fn pool() -> RenderPool {
    let agent = UserAgentConfig {
        crawler_name: "Sitegauge".to_string(),
        crawler_version: "0.1".to_string(),
        contact_url: None,
    };
    let source = HttpPageSource::from_config(&agent, Duration::from_secs(5))
        .expect("Failed to build client");
    RenderPool::new(
        Arc::new(source),
        3,
        RenderOptions::new(Duration::from_secs(5), Vec::new()),
    )
}

async fn extract(server: &MockServer, urls: &[String], mode: BoilerplateMode) -> Extraction {
    let root = Url::parse(&server.uri()).unwrap();
    let config = ExtractionConfig {
        boilerplate: mode,
        sample_size: 5,
        ..Default::default()
    };
    let pool = pool();

    let filter = sample_boilerplate(&pool, &root, urls, &config).await;
    ExtractionCoordinator::new(pool, filter, root, 4, 5)
        .run(urls)
        .await
}

#[tokio::test]
async fn test_repeated_nav_headings_are_excluded() {
    let (server, urls) = five_page_site().await;

    let extraction = extract(&server, &urls, BoilerplateMode::RepeatedBlocks).await;

    assert_eq!(extraction.report.extracted, 5);
    assert_eq!(extraction.report.pruned_blocks, 5);
    for record in &extraction.records {
        let headings = record.headings.expect("extracted record has headings");
        // the nav's <h2>Sections</h2> is gone, the page's own <h2> stays
        assert_eq!(headings.as_array(), [1, 1, 0, 0, 0, 0], "{}", record.url);
    }
}

#[tokio::test]
async fn test_without_pruning_nav_headings_count() {
    let (server, urls) = five_page_site().await;

    let extraction = extract(&server, &urls, BoilerplateMode::Off).await;

    assert_eq!(extraction.report.pruned_blocks, 0);
    for record in &extraction.records {
        assert_eq!(record.headings.unwrap().get(2), 2);
    }
}

#[tokio::test]
async fn test_pruned_nav_links_leave_the_link_set() {
    let (server, urls) = five_page_site().await;

    let extraction = extract(&server, &urls, BoilerplateMode::RepeatedBlocks).await;

    let first = &extraction.records[0];
    assert_eq!(first.url, site_url(&server, "/page-0"));
    assert_eq!(first.title.as_deref(), Some("Page 0"));
    assert_eq!(first.description.as_deref(), Some("About page 0"));
    assert_eq!(first.internal_links, vec![site_url(&server, "/page-1")]);

    assert_eq!(
        extraction.records[2].internal_links,
        vec![site_url(&server, "/page-3")]
    );
    assert!(extraction.records[4].internal_links.is_empty());
}

#[tokio::test]
async fn test_navigational_paths_skip_nav_anchors() {
    let (server, urls) = five_page_site().await;

    let extraction = extract(&server, &urls, BoilerplateMode::NavigationalPaths).await;

    assert_eq!(extraction.report.pruned_blocks, 0);
    // three nav anchors on each of five pages
    assert_eq!(extraction.report.skipped_nav_links, 15);
    for record in &extraction.records {
        // the nav heading is still counted in this mode
        assert_eq!(record.headings.unwrap().get(2), 2);
        assert!(!record.internal_links.contains(&site_url(&server, "/contact")));
    }
}

#[tokio::test]
async fn test_failed_page_is_absent() {
    let (server, mut urls) = five_page_site().await;
    urls.push(site_url(&server, "/missing"));

    let extraction = extract(&server, &urls, BoilerplateMode::RepeatedBlocks).await;

    assert_eq!(extraction.report.attempted, 6);
    assert_eq!(extraction.report.extracted, 5);
    assert_eq!(extraction.report.failed, 1);
    assert!(extraction
        .records
        .iter()
        .all(|record| !record.url.ends_with("/missing")));
}

#[tokio::test]
async fn test_single_page_site_is_not_pruned() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body><main><h1>Welcome</h1><h2>Sub</h2><a href="/about">About</a></main></body></html>"#.to_string(),
    )
    .await;
    let urls = vec![site_url(&server, "/")];

    let extraction = extract(&server, &urls, BoilerplateMode::Combined).await;

    assert_eq!(extraction.report.pruned_blocks, 0);
    assert_eq!(extraction.report.skipped_nav_links, 0);
    let record = &extraction.records[0];
    assert_eq!(record.headings.unwrap().as_array(), [1, 1, 0, 0, 0, 0]);
    assert_eq!(record.internal_links, vec![site_url(&server, "/about")]);
}
