// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the content source
//!
//! Defines the source base URL, per-partition cache TTLs, fetch limits and
//! the stream scheme.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Which stream endpoint scheme the source speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamScheme {
    /// JSON playback-data endpoint
    #[default]
    Structured,
    /// Older HTML player page, scraped
    Legacy,
}

impl FromStr for StreamScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "legacy" | "html" => Ok(Self::Legacy),
            other => Err(format!("unknown stream scheme '{other}'")),
        }
    }
}

/// Configuration for the content source
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Site base URL (default: https://animefire.io)
    pub base_url: String,
    /// Catalog cache TTL in seconds (default: 1800 = 30 minutes)
    pub catalog_ttl_secs: u64,
    /// Metadata cache TTL in seconds (default: 86400 = 24 hours)
    pub meta_ttl_secs: u64,
    /// Stream cache TTL in seconds (default: 14400 = 4 hours)
    pub stream_ttl_secs: u64,
    /// Timeout per fetch in seconds (default: 10)
    pub fetch_timeout_secs: u64,
    /// Maximum entries per cache partition (default: unbounded)
    pub max_cache_entries: Option<usize>,
    /// Stream endpoint scheme (default: structured)
    pub stream_scheme: StreamScheme,
    /// Optional TOML file overriding the extraction rules
    pub rules_path: Option<PathBuf>,
}

impl SourceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("ANIMEFIRE_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            catalog_ttl_secs: env_u64("CATALOG_CACHE_TTL_SECS").unwrap_or(defaults.catalog_ttl_secs),
            meta_ttl_secs: env_u64("META_CACHE_TTL_SECS").unwrap_or(defaults.meta_ttl_secs),
            stream_ttl_secs: env_u64("STREAM_CACHE_TTL_SECS").unwrap_or(defaults.stream_ttl_secs),
            fetch_timeout_secs: env_u64("FETCH_TIMEOUT_SECS").unwrap_or(defaults.fetch_timeout_secs),
            max_cache_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok()),
            stream_scheme: env::var("STREAM_SOURCE_SCHEME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            rules_path: env::var("EXTRACTION_RULES_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.base()?;
        if self.catalog_ttl_secs == 0 || self.meta_ttl_secs == 0 || self.stream_ttl_secs == 0 {
            return Err("cache TTLs must be at least 1 second".to_string());
        }
        if self.fetch_timeout_secs == 0 {
            return Err("fetch_timeout_secs must be at least 1".to_string());
        }
        if self.max_cache_entries == Some(0) {
            return Err("max_cache_entries must be at least 1 when set".to_string());
        }
        Ok(())
    }

    /// Parsed base URL with a trailing slash, ready for joining
    pub fn base(&self) -> Result<Url, String> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|e| format!("invalid base URL '{}': {e}", self.base_url))?;
        if url.cannot_be_a_base() {
            return Err(format!("base URL '{}' cannot be joined", self.base_url));
        }
        Ok(url)
    }

    pub fn catalog_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_ttl_secs)
    }

    pub fn meta_ttl(&self) -> Duration {
        Duration::from_secs(self.meta_ttl_secs)
    }

    pub fn stream_ttl(&self) -> Duration {
        Duration::from_secs(self.stream_ttl_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://animefire.io".to_string(),
            catalog_ttl_secs: 1800,
            meta_ttl_secs: 86400,
            stream_ttl_secs: 14400,
            fetch_timeout_secs: 10,
            max_cache_entries: None,
            stream_scheme: StreamScheme::Structured,
            rules_path: None,
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Listen address for the addon server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (default: 0.0.0.0)
    pub host: String,
    /// Bind port (default: 7000)
    pub port: u16,
}

impl ServerConfig {
    /// Load from `HOST` / `PORT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7000,
        }
    }
}
