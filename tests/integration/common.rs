//! Shared helpers for the integration tests

use sitegauge::config::{parse_config, Config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a validated config for the site served by `server`
///
/// `extraction` is spliced into the `[extraction]` table.
pub fn config_for(server: &MockServer, database_path: &str, extraction: &str) -> Config {
    parse_config(&format!(
        r#"
[site]
root-url = "{}/"

[user-agent]
crawler-name = "Sitegauge"
crawler-version = "0.1"

[http]
timeout-ms = 5000

[extraction]
concurrency = 4
{}

[output]
database-path = "{}"
"#,
        server.uri(),
        extraction,
        database_path.replace('\\', "/")
    ))
    .expect("Failed to parse test config")
}

/// Serves `body` at `route` with an HTML content type
pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Serves `body` at `route` as plain text
pub async fn mount_text(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// A `<urlset>` listing `routes` under the server's base URL
pub fn urlset(server: &MockServer, routes: &[&str]) -> String {
    let entries: String = routes
        .iter()
        .map(|route| format!("<url><loc>{}{}</loc></url>", server.uri(), route))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// A page with a title, an `<h1>` and the given body markup
pub fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><main><h1>{}</h1>{}</main></body></html>",
        title, title, body
    )
}

/// Absolute URL of `route` in normalized form
pub fn site_url(server: &MockServer, route: &str) -> String {
    let base = server.uri();
    if route == "/" {
        base
    } else {
        format!("{}{}", base, route)
    }
}
