use crate::config::types::{
    Config, DiscoveryConfig, ExtractionConfig, HttpConfig, OutputConfig, SiteConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_http_config(&config.http)?;
    validate_discovery_config(&config.discovery)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site root
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", config.root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' must use http or https",
            config.root_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' has no host",
            config.root_url
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    // The name doubles as the robots.txt product token
    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only letters, digits, '-' or '_', got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout-ms must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Validates discovery limits
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if !config.sitemap_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "sitemap-path must start with '/', got '{}'",
            config.sitemap_path
        )));
    }

    if config.page_cap < 1 {
        return Err(ConfigError::Validation(
            "page-cap must be >= 1".to_string(),
        ));
    }

    if config.batch_width < 1 || config.batch_width > 256 {
        return Err(ConfigError::Validation(format!(
            "batch-width must be between 1 and 256, got {}",
            config.batch_width
        )));
    }

    if config.sitemap_fan_out < 1 {
        return Err(ConfigError::Validation(
            "sitemap-fan-out must be >= 1".to_string(),
        ));
    }

    if config.max_path_segments < 1 {
        return Err(ConfigError::Validation(
            "max-path-segments must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates extraction tuning
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.concurrency == Some(0) {
        return Err(ConfigError::Validation(
            "concurrency must be >= 1".to_string(),
        ));
    }

    if config.render_slots == Some(0) {
        return Err(ConfigError::Validation(
            "render-slots must be >= 1".to_string(),
        ));
    }

    if !(config.nav_threshold > 0.0 && config.nav_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "nav-threshold must be in (0, 1], got {}",
            config.nav_threshold
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::MissingStorage);
    }

    if let Some(csv_path) = &config.csv_path {
        if csv_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "csv-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
