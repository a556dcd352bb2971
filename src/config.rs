//! Configuration parsing and validation.
//!
//! Sinai Search is configured via a TOML file (default: `config/sinai.toml`).
//!
//! # Example
//!
//! ```toml
//! [solr]
//! base_url = "http://localhost:8983/solr/sinai"
//! timeout_secs = 30
//! max_rows = 10000000
//!
//! [search]
//! timeout_secs = 60
//!
//! [server]
//! bind = "127.0.0.1:8000"
//! ```
//!
//! Only `solr.base_url` is required; every other key has a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use sinai_search_core::query::DEFAULT_MAX_ROWS;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub solr: SolrConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection to the Solr core holding the catalog.
#[derive(Debug, Deserialize, Clone)]
pub struct SolrConfig {
    /// Core URL, e.g. `http://localhost:8983/solr/sinai`. Request paths
    /// (`/query`, `/update`) are appended to it.
    pub base_url: String,
    /// Per-request HTTP timeout.
    #[serde(default = "default_solr_timeout_secs")]
    pub timeout_secs: u64,
    /// Row cap applied to every query.
    #[serde(default = "default_max_rows")]
    pub max_rows: u64,
}

fn default_solr_timeout_secs() -> u64 {
    30
}
fn default_max_rows() -> u64 {
    DEFAULT_MAX_ROWS
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Deadline for a whole search, as seen by the caller.
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_search_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// Defaults pointing at a local Solr, for commands run without a
    /// config file.
    pub fn minimal() -> Self {
        Self {
            solr: SolrConfig {
                base_url: "http://localhost:8983/solr/sinai".to_string(),
                timeout_secs: default_solr_timeout_secs(),
                max_rows: default_max_rows(),
            },
            search: SearchConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn solr_timeout(&self) -> Duration {
        Duration::from_secs(self.solr.timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_secs)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate solr
    let base_url = config.solr.base_url.trim_end_matches('/').to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        anyhow::bail!(
            "solr.base_url must be an http(s) URL, got '{}'",
            config.solr.base_url
        );
    }
    config.solr.base_url = base_url;

    if config.solr.max_rows == 0 {
        anyhow::bail!("solr.max_rows must be >= 1");
    }
    if config.solr.timeout_secs == 0 {
        anyhow::bail!("solr.timeout_secs must be >= 1");
    }

    // Validate search
    if config.search.timeout_secs == 0 {
        anyhow::bail!("search.timeout_secs must be >= 1");
    }

    Ok(config)
}
