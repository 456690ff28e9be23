//! Configuration module for Sitegauge
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitegauge::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitegauge.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.discovery.page_cap);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BoilerplateMode, Config, DiscoveryConfig, ExtractionConfig, HttpConfig, OutputConfig,
    Renderer, ResourceKind, RobotsConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
