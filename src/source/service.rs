// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Addon service: the three resolvers behind one panic-safe facade
//!
//! Owns the cache partitions (created once here, handed to the resolvers)
//! and is the boundary past which no failure travels: every entry point
//! returns a benign value, even if a resolution panics.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use super::catalog::CatalogResolver;
use super::config::SourceConfig;
use super::fetcher::{FetchError, HttpFetcher, PageFetcher};
use super::meta::MetaResolver;
use super::rules::{ExtractionRules, RuleError};
use super::stream::{strategy_for, StreamResolver};
use super::types::{ContentDetail, ContentKind, ContentSummary, ListingKind, StreamCandidate};
use crate::cache::{CacheStats, Clock, SystemClock, TtlCache};

/// Service construction errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Fetcher(#[from] FetchError),
}

/// Statistics for every cache partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCacheStats {
    pub catalog: CacheStats,
    pub meta: CacheStats,
    pub streams: CacheStats,
}

pub struct AddonService {
    config: SourceConfig,
    catalog: CatalogResolver,
    meta: MetaResolver,
    streams: StreamResolver,
    catalog_cache: Arc<TtlCache<String, Vec<ContentSummary>>>,
    meta_cache: Arc<TtlCache<String, ContentDetail>>,
    stream_cache: Arc<TtlCache<String, Vec<StreamCandidate>>>,
}

impl std::fmt::Debug for AddonService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AddonService {
    /// Production service: HTTP fetcher, wall clock, rules from config
    pub fn new(config: SourceConfig) -> Result<Self, ServiceError> {
        config.validate().map_err(ServiceError::Config)?;
        let rules = ExtractionRules::resolve(config.rules_path.as_deref())?;
        let fetcher = Arc::new(HttpFetcher::new(&config)?);
        Self::with_fetcher(config, &rules, fetcher, Arc::new(SystemClock))
    }

    /// Service over an arbitrary fetcher and clock
    pub fn with_fetcher(
        config: SourceConfig,
        rules: &ExtractionRules,
        fetcher: Arc<dyn PageFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        config.validate().map_err(ServiceError::Config)?;
        let base = config.base().map_err(ServiceError::Config)?;

        let catalog_cache = Arc::new(TtlCache::with_capacity_bound(
            clock.clone(),
            config.max_cache_entries,
        ));
        let meta_cache = Arc::new(TtlCache::with_capacity_bound(
            clock.clone(),
            config.max_cache_entries,
        ));
        let stream_cache = Arc::new(TtlCache::with_capacity_bound(
            clock.clone(),
            config.max_cache_entries,
        ));

        let catalog = CatalogResolver::new(
            fetcher.clone(),
            catalog_cache.clone(),
            &rules.catalog,
            base.clone(),
            config.catalog_ttl(),
        )?;
        let meta = MetaResolver::new(
            fetcher.clone(),
            meta_cache.clone(),
            &rules.meta,
            &rules.episodes,
            base.clone(),
            config.meta_ttl(),
            clock,
        )?;
        let strategy = strategy_for(config.stream_scheme, rules)?;
        let streams = StreamResolver::new(
            fetcher,
            stream_cache.clone(),
            strategy,
            base,
            config.stream_ttl(),
        );

        info!(
            "Addon service ready for {} (stream scheme: {:?})",
            config.base_url, config.stream_scheme
        );

        Ok(Self {
            config,
            catalog,
            meta,
            streams,
            catalog_cache,
            meta_cache,
            stream_cache,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Catalog listing; empty on any failure
    pub async fn catalog(&self, listing: ListingKind, search: Option<&str>) -> Vec<ContentSummary> {
        guarded("catalog", self.catalog.resolve(listing, search), Vec::new).await
    }

    /// Content detail; degraded on any failure
    pub async fn meta(&self, id: &str) -> ContentDetail {
        guarded("meta", self.meta.resolve(id), || {
            ContentDetail::degraded(id, ContentKind::Anime)
        })
        .await
    }

    /// Stream candidates; empty on any failure
    pub async fn streams(&self, id: &str) -> Vec<StreamCandidate> {
        guarded("streams", self.streams.resolve(id), Vec::new).await
    }

    pub fn cache_stats(&self) -> ServiceCacheStats {
        ServiceCacheStats {
            catalog: self.catalog_cache.stats(),
            meta: self.meta_cache.stats(),
            streams: self.stream_cache.stats(),
        }
    }

    /// Drop every cached entry in all partitions
    pub fn clear_caches(&self) {
        self.catalog_cache.clear();
        self.meta_cache.clear();
        self.stream_cache.clear();
    }

    /// Evict expired entries in all partitions, returning how many went
    pub fn purge_expired(&self) -> usize {
        self.catalog_cache.purge_expired()
            + self.meta_cache.purge_expired()
            + self.stream_cache.purge_expired()
    }
}

async fn guarded<T, F, D>(operation: &str, resolution: F, fallback: D) -> T
where
    F: Future<Output = T>,
    D: FnOnce() -> T,
{
    match AssertUnwindSafe(resolution).catch_unwind().await {
        Ok(value) => value,
        Err(panic) => {
            error!("{} resolution panicked: {}", operation, panic_message(&panic));
            fallback()
        }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
