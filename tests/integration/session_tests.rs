//! Whole runs persisted to SQLite

use crate::common::{config_for, mount_html, mount_text, page, site_url, urlset};
use sitegauge::storage::{open_storage, RunStatus, Storage};
use sitegauge::{AuditSession, UrlStatus};
use tempfile::TempDir;
use wiremock::MockServer;

async fn blog(server: &MockServer, robots: &str) {
    mount_text(server, "/robots.txt", robots.to_string()).await;
    mount_text(
        server,
        "/sitemap.xml",
        urlset(server, &["/", "/posts/first", "/posts/second"]),
    )
    .await;
    mount_html(
        server,
        "/",
        page(
            "Blog",
            r#"<a href="/posts/first">First</a><a href="/posts/second">Second</a><a href="/tags">Tags</a>"#,
        ),
    )
    .await;
    mount_html(
        server,
        "/posts/first",
        page("First post", r#"<a href="/posts/second">next</a>"#),
    )
    .await;
    mount_html(server, "/posts/second", page("Second post", r#"<a href="/">home</a>"#)).await;
    mount_html(server, "/tags", page("Tags", "")).await;
}

fn database(dir: &TempDir) -> String {
    dir.path().join("audit.db").display().to_string()
}

#[tokio::test]
async fn test_run_persists_to_sqlite() {
    let server = MockServer::start().await;
    blog(&server, "User-agent: *\nDisallow:").await;
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("audit.csv");

    let mut config = config_for(&server, &database(&dir), r#"boilerplate = "off""#);
    config.output.csv_path = Some(csv.display().to_string());

    let mut session = AuditSession::open(config.clone(), "hash-1").expect("Failed to open session");
    let summary = session.run().await.expect("Run failed");
    assert_eq!(summary.discovery.indexed, 3);
    assert_eq!(summary.discovery.non_indexed, 1);
    assert_eq!(summary.extraction.extracted, 3);
    assert_eq!(summary.csv_rows, Some(4));
    let key = session.site_key().to_string();
    drop(session);

    // a fresh connection sees everything the run wrote
    let storage = open_storage(std::path::Path::new(&config.output.database_path)).unwrap();
    let records = storage.fetch_url_records(&key).unwrap();
    assert_eq!(records.len(), 4);

    let second = &records[&site_url(&server, "/posts/second")];
    assert_eq!(second.status, UrlStatus::Indexed);
    assert_eq!(second.title.as_deref(), Some("Second post"));
    assert_eq!(second.incoming_link_count, Some(2));
    assert_eq!(second.headings.unwrap().get(1), 1);

    let tags = &records[&site_url(&server, "/tags")];
    assert_eq!(tags.status, UrlStatus::NonIndexed);
    assert!(!tags.is_extracted());
    assert_eq!(tags.incoming_link_count, Some(1));

    let run = storage.latest_run(&key).unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "hash-1");
    assert_eq!(run.counts.extracted, 3);

    let exported = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(exported.lines().count(), 5);
    assert!(exported.contains("Second post"));
    assert!(exported.lines().any(|line| line.contains("/tags") && line.contains("N/A")));
}

#[tokio::test]
async fn test_discover_then_extract_in_separate_sessions() {
    let server = MockServer::start().await;
    blog(&server, "User-agent: *\nDisallow:").await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &database(&dir), "");

    let report = AuditSession::open(config.clone(), "h")
        .unwrap()
        .discover()
        .await
        .unwrap();
    assert_eq!(report.total(), 4);

    let mut session = AuditSession::open(config, "h").unwrap();
    let report = session.extract().await.unwrap();
    assert_eq!(report.attempted, 3);
    assert_eq!(report.extracted, 3);

    let records = session.storage().fetch_url_records(session.site_key()).unwrap();
    assert_eq!(
        records[&site_url(&server, "/posts/first")].title.as_deref(),
        Some("First post")
    );
    assert!(session.storage().latest_run(session.site_key()).unwrap().is_none());
}

#[tokio::test]
async fn test_non_indexed_is_never_promoted() {
    let server = MockServer::start().await;
    blog(&server, "User-agent: *\nDisallow: /posts/second").await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &database(&dir), "");

    let mut session = AuditSession::open(config.clone(), "h").unwrap();
    session.discover().await.unwrap();
    let second = site_url(&server, "/posts/second");
    let records = session.storage().fetch_url_records(session.site_key()).unwrap();
    assert_eq!(records[&second].status, UrlStatus::NonIndexed);
    drop(session);

    // the site later lifts the rule
    server.reset().await;
    blog(&server, "User-agent: *\nDisallow:").await;

    let mut session = AuditSession::open(config, "h").unwrap();
    let report = session.discover().await.unwrap();
    assert_eq!(report.indexed, 3);

    let records = session.storage().fetch_url_records(session.site_key()).unwrap();
    assert_eq!(records[&second].status, UrlStatus::NonIndexed);
    assert_eq!(records[&site_url(&server, "/posts/first")].status, UrlStatus::Indexed);

    let report = session.extract().await.unwrap();
    assert_eq!(report.attempted, 2);
}

#[tokio::test]
async fn test_page_failing_on_rerun_leaves_the_link_graph() {
    let server = MockServer::start().await;
    blog(&server, "User-agent: *\nDisallow:").await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&server, &database(&dir), r#"boilerplate = "off""#);
    let first = site_url(&server, "/posts/first");

    let mut session = AuditSession::open(config.clone(), "h").unwrap();
    session.run().await.unwrap();
    let records = session.storage().fetch_url_records(session.site_key()).unwrap();
    assert_eq!(records[&first].incoming_link_count, Some(1));
    drop(session);

    // the home page goes away; everything else stays
    server.reset().await;
    mount_text(
        &server,
        "/sitemap.xml",
        urlset(&server, &["/", "/posts/first", "/posts/second"]),
    )
    .await;
    mount_html(
        &server,
        "/posts/first",
        page("First post", r#"<a href="/posts/second">next</a>"#),
    )
    .await;
    mount_html(&server, "/posts/second", page("Second post", r#"<a href="/">home</a>"#)).await;

    let mut session = AuditSession::open(config, "h").unwrap();
    let summary = session.run().await.unwrap();
    assert_eq!(summary.extraction.failed, 1);

    let records = session.storage().fetch_url_records(session.site_key()).unwrap();
    let home = &records[&site_url(&server, "/")];
    assert!(!home.is_extracted());
    assert!(home.internal_links.is_empty());
    assert_eq!(records[&first].incoming_link_count, Some(0));
    assert_eq!(
        records[&site_url(&server, "/posts/second")].incoming_link_count,
        Some(1)
    );
    assert_eq!(home.incoming_link_count, Some(1));
}
