/// Configuration module for athlete-resolver.
///
/// Handles loading, validating, and providing default configuration values.
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "athlete-resolver.json";

// ── Default value functions ──────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.onefc.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_locales() -> Vec<LocaleConfig> {
    [
        ("en", "English", ""),
        ("th", "Thai", "th"),
        ("jp", "Japanese", "jp"),
        ("cn", "Chinese", "cn"),
    ]
    .into_iter()
    .map(|(code, label, prefix)| LocaleConfig {
        code: code.to_string(),
        label: label.to_string(),
        path_prefix: prefix.to_string(),
    })
    .collect()
}

fn default_primary_locale() -> String {
    "en".to_string()
}

fn default_worker_width() -> usize {
    4
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_nationality_separator() -> String {
    " / ".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_search_api_url() -> String {
    "https://serpapi.com/search.json".to_string()
}

fn default_search_engine() -> String {
    "google".to_string()
}

fn default_search_qualifier() -> String {
    "ONE Championship fighter nationality".to_string()
}

fn default_search_max_results() -> usize {
    3
}

fn default_listing_path() -> String {
    "/athletes/".to_string()
}

fn default_listing_max_pages() -> usize {
    5
}

fn default_listing_ttl_secs() -> u64 {
    24 * 60 * 60
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_locales")]
    pub locales: Vec<LocaleConfig>,

    #[serde(default = "default_primary_locale")]
    pub primary_locale: String,

    /// Width of the worker pool used for localized name fetches.
    #[serde(default = "default_worker_width")]
    pub worker_width: usize,

    /// Pause between successive queries of a batch.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    #[serde(default = "default_nationality_separator")]
    pub nationality_separator: String,

    /// Extra slug → country entries layered over the built-in table.
    #[serde(default)]
    pub static_nationalities: BTreeMap<String, String>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub site_index: SiteIndexConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    pub code: String,
    #[serde(default)]
    pub label: String,
    /// URL path segment inserted before `/athletes/`; empty for the default site.
    #[serde(default)]
    pub path_prefix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_api_url")]
    pub api_url: String,

    /// Empty disables the search strategy.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_search_engine")]
    pub engine: String,

    #[serde(default = "default_search_qualifier")]
    pub qualifier: String,

    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteIndexConfig {
    #[serde(default = "default_listing_path")]
    pub listing_path: String,

    #[serde(default = "default_listing_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_listing_ttl_secs")]
    pub ttl_secs: u64,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            locales: default_locales(),
            primary_locale: default_primary_locale(),
            worker_width: default_worker_width(),
            batch_delay_ms: default_batch_delay_ms(),
            nationality_separator: default_nationality_separator(),
            static_nationalities: BTreeMap::new(),
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
            site_index: SiteIndexConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: default_search_api_url(),
            api_key: String::new(),
            engine: default_search_engine(),
            qualifier: default_search_qualifier(),
            max_results: default_search_max_results(),
        }
    }
}

impl Default for SiteIndexConfig {
    fn default() -> Self {
        Self {
            listing_path: default_listing_path(),
            max_pages: default_listing_max_pages(),
            ttl_secs: default_listing_ttl_secs(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `athlete-resolver.json`.
    /// If the file does not exist, returns a default config and, for the
    /// default path only, writes a template file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.base_url.trim().is_empty(), "base_url must be set");
        anyhow::ensure!(
            (5..=10).contains(&self.request_timeout_secs),
            "request_timeout_secs must be between 5 and 10, got {}",
            self.request_timeout_secs
        );
        anyhow::ensure!(self.worker_width > 0, "worker_width must be positive");
        anyhow::ensure!(!self.locales.is_empty(), "at least one locale must be configured");
        anyhow::ensure!(
            self.locale(&self.primary_locale).is_some(),
            "primary_locale {:?} is not among the configured locales",
            self.primary_locale
        );
        anyhow::ensure!(self.cache.capacity > 0, "cache.capacity must be positive");
        Ok(())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    #[must_use]
    pub fn locale(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|l| l.code == code)
    }

    /// Locale codes in configuration order.
    #[must_use]
    pub fn locale_codes(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.code.as_str()).collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
