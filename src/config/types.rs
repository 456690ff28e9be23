use serde::Deserialize;

/// Main configuration structure for Sitegauge
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// The website being surveyed
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site (e.g., "https://www.example.com")
    #[serde(rename = "root-url")]
    pub root_url: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt agent token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Subresource kinds a renderer may skip loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Stylesheet,
    Font,
    Media,
}

/// Backend used for extraction renders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Server-side markup fetched with reqwest
    #[default]
    Http,
    /// Headless Chrome, available with the `browser` feature
    Browser,
}

/// HTTP/render behaviour shared by every fetch
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Per-operation timeout for fetches and renders (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Subresources a renderer is allowed to block
    #[serde(rename = "block-resources", default = "default_block_resources")]
    pub block_resources: Vec<ResourceKind>,

    #[serde(default)]
    pub renderer: Renderer,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            block_resources: default_block_resources(),
            renderer: Renderer::default(),
        }
    }
}

/// URL discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Path of the root sitemap relative to the site root
    #[serde(rename = "sitemap-path", default = "default_sitemap_path")]
    pub sitemap_path: String,

    /// Maximum nested sitemaps resolved concurrently
    #[serde(rename = "sitemap-fan-out", default = "default_sitemap_fan_out")]
    pub sitemap_fan_out: usize,

    /// Maximum number of pages the frontier crawler visits
    #[serde(rename = "page-cap", default = "default_page_cap")]
    pub page_cap: usize,

    /// Pages fetched concurrently per breadth-first round
    #[serde(rename = "batch-width", default = "default_batch_width")]
    pub batch_width: usize,

    /// Path segments kept by URL normalization
    #[serde(rename = "max-path-segments", default = "default_max_path_segments")]
    pub max_path_segments: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sitemap_path: default_sitemap_path(),
            sitemap_fan_out: default_sitemap_fan_out(),
            page_cap: default_page_cap(),
            batch_width: default_batch_width(),
            max_path_segments: default_max_path_segments(),
        }
    }
}

/// Robots.txt interpretation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RobotsConfig {
    /// Evaluate rules for the crawler's own agent group instead of
    /// applying every `Disallow` line globally
    #[serde(rename = "per-agent", default)]
    pub per_agent: bool,
}

/// Which boilerplate pre-pass runs before metadata extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoilerplateMode {
    /// Prune body-level blocks present on every sampled page
    #[default]
    RepeatedBlocks,
    /// Skip anchors whose DOM path recurs across sampled pages
    NavigationalPaths,
    /// Both of the above
    Combined,
    /// No sampling, no filtering
    Off,
}

/// Content extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Concurrent extraction tasks (defaults to min(32, cores + 4))
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Concurrent rendering sessions (defaults to `concurrency`)
    #[serde(rename = "render-slots", default)]
    pub render_slots: Option<usize>,

    /// Pages sampled for boilerplate detection
    #[serde(rename = "sample-size", default = "default_sample_size")]
    pub sample_size: usize,

    /// Fraction of sampled pages a DOM path must appear on to be navigational
    #[serde(rename = "nav-threshold", default = "default_nav_threshold")]
    pub nav_threshold: f64,

    /// Boilerplate pre-pass strategy
    #[serde(default)]
    pub boilerplate: BoilerplateMode,

    /// Extra render attempts after a failure
    #[serde(rename = "render-retries", default)]
    pub render_retries: u32,
}

impl ExtractionConfig {
    /// Effective task concurrency
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency
            .unwrap_or_else(|| std::cmp::min(32, num_cpus::get() + 4))
    }

    /// Effective number of rendering sessions
    pub fn effective_render_slots(&self) -> usize {
        self.render_slots
            .unwrap_or_else(|| self.effective_concurrency())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            concurrency: None,
            render_slots: None,
            sample_size: default_sample_size(),
            nav_threshold: default_nav_threshold(),
            boilerplate: BoilerplateMode::default(),
            render_retries: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Where to write the CSV export after a run
    #[serde(rename = "csv-path", default)]
    pub csv_path: Option<String>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_block_resources() -> Vec<ResourceKind> {
    vec![
        ResourceKind::Image,
        ResourceKind::Stylesheet,
        ResourceKind::Font,
    ]
}

fn default_sitemap_path() -> String {
    "/sitemap.xml".to_string()
}

fn default_sitemap_fan_out() -> usize {
    8
}

fn default_page_cap() -> usize {
    200
}

fn default_batch_width() -> usize {
    16
}

fn default_max_path_segments() -> usize {
    5
}

fn default_sample_size() -> usize {
    20
}

fn default_nav_threshold() -> f64 {
    0.8
}
