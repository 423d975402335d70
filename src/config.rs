/// Service configuration loader - parses buoymon.toml
///
/// Separates operational settings from code, making it easy to point the
/// service at a staging feed, shorten the poll interval for debugging, or
/// enable the HTTP endpoint without recompiling.

use serde::Deserialize;
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::time::Duration;

use crate::ingest::kingcounty::API_URL;

/// Default configuration file, expected in the current working directory.
pub const DEFAULT_CONFIG_PATH: &str = "buoymon.toml";

/// Environment variable overriding the feed URL (honored via .env too).
pub const ENV_FEED_URL: &str = "BUOYMON_FEED_URL";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;

/// Resolved service configuration with all defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Upstream map-data URL.
    pub feed_url: String,

    /// Per-request timeout for the feed fetch, in seconds.
    pub fetch_timeout_secs: u64,

    /// Seconds between refresh cycles.
    pub poll_interval_secs: u64,

    /// Port for the query endpoint; None leaves the endpoint off.
    pub endpoint_port: Option<u16>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            feed_url: API_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            endpoint_port: None,
        }
    }
}

impl ServiceConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

// ---------------------------------------------------------------------------
// TOML file shape
// ---------------------------------------------------------------------------

/// Root structure for TOML parsing. Every table and key is optional;
/// missing values fall back to defaults.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    feed: Option<FeedSection>,
    service: Option<ServiceSection>,
}

#[derive(Debug, Deserialize)]
struct FeedSection {
    url: Option<String>,
    fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ServiceSection {
    poll_interval_secs: Option<u64>,
    endpoint_port: Option<u16>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration file contents, applying defaults for missing keys.
pub fn from_toml_str(contents: &str) -> Result<ServiceConfig, String> {
    let file: ConfigFile =
        toml::from_str(contents).map_err(|e| format!("Failed to parse config: {}", e))?;

    let mut config = ServiceConfig::default();

    if let Some(feed) = file.feed {
        if let Some(url) = feed.url {
            config.feed_url = url;
        }
        if let Some(secs) = feed.fetch_timeout_secs {
            config.fetch_timeout_secs = secs;
        }
    }

    if let Some(service) = file.service {
        if let Some(secs) = service.poll_interval_secs {
            config.poll_interval_secs = secs;
        }
        if let Some(port) = service.endpoint_port {
            config.endpoint_port = Some(port);
        }
    }

    Ok(config)
}

/// Loads service configuration from the given path.
///
/// A missing file is not an error — the service runs on defaults. A file
/// that exists but cannot be read or parsed is a setup failure, because
/// silently ignoring it would poll the wrong feed at the wrong rate.
pub fn load_config(path: &str) -> Result<ServiceConfig, String> {
    let mut config = match fs::read_to_string(path) {
        Ok(contents) => from_toml_str(&contents)?,
        Err(e) if e.kind() == ErrorKind::NotFound => ServiceConfig::default(),
        Err(e) => return Err(format!("Failed to read {}: {}", path, e)),
    };

    apply_env_override(&mut config, env::var(ENV_FEED_URL).ok());
    validate(&config)?;

    Ok(config)
}

/// Replaces the feed URL when the override variable is set and non-empty.
fn apply_env_override(config: &mut ServiceConfig, override_url: Option<String>) {
    if let Some(url) = override_url {
        if !url.is_empty() {
            config.feed_url = url;
        }
    }
}

fn validate(config: &ServiceConfig) -> Result<(), String> {
    if config.feed_url.is_empty() {
        return Err("feed url must not be empty".to_string());
    }
    if config.fetch_timeout_secs == 0 {
        return Err("fetch_timeout_secs must be nonzero".to_string());
    }
    if config.poll_interval_secs == 0 {
        return Err("poll_interval_secs must be nonzero".to_string());
    }
    Ok(())
}
