//! Incoming link counts from extracted pages

use crate::common::{config_for, mount_html, mount_text, page, site_url, urlset};
use sitegauge::graph::LinkGraph;
use sitegauge::render::HttpPageSource;
use sitegauge::storage::MemoryStorage;
use sitegauge::{AuditSession, UrlRecord, UrlStatus};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

#[tokio::test]
async fn test_two_pages_linking_to_x() {
    let server = MockServer::start().await;

    mount_text(&server, "/sitemap.xml", urlset(&server, &["/a", "/b", "/x"])).await;
    mount_html(&server, "/a", page("A", r#"<a href="/x">x</a><a href="/x#again">x</a>"#)).await;
    mount_html(&server, "/b", page("B", r#"<p><a href="x">x</a></p>"#)).await;
    mount_html(&server, "/x", page("X", r#"<a href="/a">back</a>"#)).await;

    let config = config_for(&server, "unused.db", r#"boilerplate = "off""#);
    let source = HttpPageSource::from_config(&config.user_agent, Duration::from_secs(5))
        .expect("Failed to build client");
    let mut session = AuditSession::new(
        config,
        "test",
        Arc::new(source),
        Box::new(MemoryStorage::new()),
    )
    .expect("Failed to create session");

    let summary = session.run().await.expect("Run failed");
    assert_eq!(summary.extraction.extracted, 3);

    let records = session
        .storage()
        .fetch_url_records(session.site_key())
        .unwrap();
    assert_eq!(records[&site_url(&server, "/x")].incoming_link_count, Some(2));
    assert_eq!(records[&site_url(&server, "/a")].incoming_link_count, Some(1));
    assert_eq!(records[&site_url(&server, "/b")].incoming_link_count, Some(0));
    assert_eq!(records[&site_url(&server, "/a")].internal_link_count(), Some(1));
}

#[test]
fn test_counts_match_link_lists() {
    let page = |url: &str, links: &[&str]| {
        let mut record = UrlRecord::discovered(url, UrlStatus::Indexed);
        record.internal_links = links.iter().map(|s| s.to_string()).collect();
        record
    };
    let records = vec![
        page("https://e.com/a", &["https://e.com/x", "https://e.com/b"]),
        page("https://e.com/b", &["https://e.com/x"]),
        page("https://e.com/c", &["https://e.com/a", "https://e.com/c"]),
    ];

    let graph = LinkGraph::build(&records);
    for target in ["https://e.com/a", "https://e.com/b", "https://e.com/c", "https://e.com/x"] {
        let linking = records
            .iter()
            .filter(|r| r.internal_links.iter().any(|l| l == target))
            .count() as u32;
        assert_eq!(graph.incoming(target), linking, "{}", target);
    }

    let reversed: Vec<UrlRecord> = records.iter().rev().cloned().collect();
    assert_eq!(LinkGraph::build(&reversed), graph);
}
