//! URL discovery against a live mock site

use crate::common::{config_for, mount_html, mount_text, page, site_url, urlset};
use sitegauge::discovery::discover;
use sitegauge::render::HttpPageSource;
use sitegauge::UrlStatus;
use std::time::Duration;
use wiremock::MockServer;

fn source() -> HttpPageSource {
    let config = sitegauge::config::UserAgentConfig {
        crawler_name: "Sitegauge".to_string(),
        crawler_version: "0.1".to_string(),
        contact_url: None,
    };
    HttpPageSource::from_config(&config, Duration::from_secs(5)).expect("Failed to build client")
}

#[tokio::test]
async fn test_sitemap_robots_and_crawl_merge() {
    let server = MockServer::start().await;

    mount_text(&server, "/robots.txt", "User-agent: *\nDisallow: /private/".to_string()).await;
    mount_text(
        &server,
        "/sitemap.xml",
        urlset(&server, &["/", "/about", "/private/x"]),
    )
    .await;
    mount_html(
        &server,
        "/",
        page("Home", r#"<a href="/about">About</a><a href="/extra">Extra</a>"#),
    )
    .await;
    mount_html(&server, "/about", page("About", r#"<a href="/">Home</a>"#)).await;
    mount_html(&server, "/extra", page("Extra", "")).await;

    let config = config_for(&server, "unused.db", "");
    let root = url::Url::parse(&config.site.root_url).unwrap();
    let discovery = discover(&source(), &root, &config).await;

    assert_eq!(discovery.statuses.len(), 4);
    assert_eq!(discovery.report.indexed, 2);
    assert_eq!(discovery.report.non_indexed, 2);
    assert_eq!(discovery.report.sitemap_urls, 3);
    assert_eq!(discovery.report.crawled_urls, 3);

    assert_eq!(discovery.statuses[&site_url(&server, "/")], UrlStatus::Indexed);
    assert_eq!(discovery.statuses[&site_url(&server, "/about")], UrlStatus::Indexed);
    assert_eq!(
        discovery.statuses[&site_url(&server, "/private/x")],
        UrlStatus::NonIndexed
    );
    assert_eq!(discovery.statuses[&site_url(&server, "/extra")], UrlStatus::NonIndexed);
}

#[tokio::test]
async fn test_sitemap_index_declared_in_robots() {
    let server = MockServer::start().await;

    mount_text(
        &server,
        "/robots.txt",
        format!("User-agent: *\nSitemap: {}/sitemaps/index.xml", server.uri()),
    )
    .await;
    mount_text(
        &server,
        "/sitemaps/index.xml",
        format!(
            "<sitemapindex><sitemap><loc>{0}/sitemaps/posts.xml</loc></sitemap><sitemap><loc>{0}/sitemaps/gone.xml</loc></sitemap></sitemapindex>",
            server.uri()
        ),
    )
    .await;
    mount_text(
        &server,
        "/sitemaps/posts.xml",
        urlset(&server, &["/posts/1/", "/posts/2?utm_source=feed"]),
    )
    .await;

    let config = config_for(&server, "unused.db", "");
    let root = url::Url::parse(&config.site.root_url).unwrap();
    let discovery = discover(&source(), &root, &config).await;

    // default /sitemap.xml is missing and the root page 404s
    assert_eq!(discovery.report.indexed, 2);
    assert_eq!(discovery.statuses[&site_url(&server, "/posts/1")], UrlStatus::Indexed);
    assert_eq!(discovery.statuses[&site_url(&server, "/posts/2")], UrlStatus::Indexed);
    assert_eq!(discovery.statuses[&site_url(&server, "/")], UrlStatus::NonIndexed);
}

#[tokio::test]
async fn test_unreachable_site_yields_only_the_seed() {
    let server = MockServer::start().await;

    let config = config_for(&server, "unused.db", "");
    let root = url::Url::parse(&config.site.root_url).unwrap();
    let discovery = discover(&source(), &root, &config).await;

    assert_eq!(discovery.report.sitemap_urls, 0);
    assert_eq!(discovery.statuses.len(), 1);
    assert_eq!(discovery.report.non_indexed, 1);
}

#[tokio::test]
async fn test_crawl_respects_page_cap() {
    let server = MockServer::start().await;

    let links: String = (0..30)
        .map(|i| format!(r#"<a href="/p{}">p</a>"#, i))
        .collect();
    mount_html(&server, "/", page("Hub", &links)).await;

    let mut config = config_for(&server, "unused.db", "");
    config.discovery.page_cap = 10;
    config.discovery.batch_width = 4;
    let root = url::Url::parse(&config.site.root_url).unwrap();
    let discovery = discover(&source(), &root, &config).await;

    assert_eq!(discovery.report.crawled_urls, 10);
}

#[tokio::test]
async fn test_one_entry_per_page_across_schemes() {
    let server = MockServer::start().await;
    let secure_spelling = server.uri().replacen("http://", "https://", 1);

    mount_text(&server, "/sitemap.xml", urlset(&server, &["/", "/a"])).await;
    mount_html(
        &server,
        "/",
        page("Home", &format!(r#"<a href="{}/a">A</a><a href="/b">B</a>"#, secure_spelling)),
    )
    .await;
    mount_html(&server, "/a", page("A", "")).await;
    mount_html(&server, "/b", page("B", "")).await;

    let config = config_for(&server, "unused.db", "");
    let root = url::Url::parse(&config.site.root_url).unwrap();
    let discovery = discover(&source(), &root, &config).await;

    assert_eq!(discovery.statuses.len(), 3);
    assert_eq!(discovery.statuses[&site_url(&server, "/a")], UrlStatus::Indexed);
    assert!(discovery.statuses.keys().all(|url| url.starts_with("http://")));
}
