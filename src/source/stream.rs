// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stream resolution: episode id → playable link candidates
//!
//! The resolver owns caching, dedup and failure handling. How the endpoint
//! URL is built and how its body is read is delegated to a
//! [`StreamStrategy`], chosen once per source scheme.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::config::StreamScheme;
use super::fetcher::PageFetcher;
use super::ids::{EpisodeId, EPISODE_DELIMITER};
use super::rules::{ExtractionRules, HtmlExtractor, JsonExtractor, RuleError};
use super::types::{ExtractionError, ResolveError, StreamCandidate};
use crate::cache::TtlCache;
use crate::utils::dedupe_by;

/// Endpoint construction and payload parsing for one source scheme
pub trait StreamStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Endpoint URL for a canonical slug and an episode token
    fn endpoint(&self, base: &Url, slug: &str, token: &str) -> String;

    /// Candidates in priority order (may contain duplicates)
    fn parse(&self, body: &str, page_url: &Url) -> Result<Vec<StreamCandidate>, ExtractionError>;
}

fn join(base: &Url, path: &str) -> String {
    base.join(path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{base}{path}"))
}

/// JSON playback-data endpoint
pub struct StructuredStrategy {
    extractor: JsonExtractor,
}

impl StructuredStrategy {
    pub fn new(rules: &ExtractionRules) -> Result<Self, RuleError> {
        Ok(Self {
            extractor: JsonExtractor::compile(&rules.streams)?,
        })
    }
}

impl StreamStrategy for StructuredStrategy {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn endpoint(&self, base: &Url, slug: &str, token: &str) -> String {
        join(base, &format!("video/{slug}/{token}?tempsubs=0"))
    }

    fn parse(&self, body: &str, _page_url: &Url) -> Result<Vec<StreamCandidate>, ExtractionError> {
        let records = self.extractor.extract(body)?;
        Ok(records
            .iter()
            .filter_map(|record| {
                let url = record.get("url")?;
                let label = record.get("label").unwrap_or("HD");
                Some(StreamCandidate {
                    title: format!("🎬 AnimeFire ({label})"),
                    url: url.to_string(),
                })
            })
            .collect())
    }
}

/// Older HTML player page, scraped
pub struct LegacyHtmlStrategy {
    extractor: HtmlExtractor,
}

impl LegacyHtmlStrategy {
    pub fn new(rules: &ExtractionRules) -> Result<Self, RuleError> {
        Ok(Self {
            extractor: HtmlExtractor::compile(&rules.legacy_streams)?,
        })
    }
}

impl StreamStrategy for LegacyHtmlStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn endpoint(&self, base: &Url, slug: &str, token: &str) -> String {
        join(base, &format!("video/{slug}/{token}"))
    }

    fn parse(&self, body: &str, page_url: &Url) -> Result<Vec<StreamCandidate>, ExtractionError> {
        let record = self.extractor.extract_first(body, page_url)?;

        let scripts = record
            .all("script_urls")
            .iter()
            .enumerate()
            .map(|(i, url)| StreamCandidate {
                title: format!("⚡ AnimeFire HD (Opção {})", i + 1),
                url: url.clone(),
            });
        let player = record.get("player_url").map(|url| StreamCandidate {
            title: "🎬 Player Principal HTML5".to_string(),
            url: url.to_string(),
        });
        let downloads = record.all("download_urls").iter().map(|url| StreamCandidate {
            title: "💾 Link Direto / Backup".to_string(),
            url: url.clone(),
        });

        Ok(scripts.chain(player).chain(downloads).collect())
    }
}

/// Strategy for a configured scheme
pub fn strategy_for(
    scheme: StreamScheme,
    rules: &ExtractionRules,
) -> Result<Arc<dyn StreamStrategy>, RuleError> {
    let strategy: Arc<dyn StreamStrategy> = match scheme {
        StreamScheme::Structured => Arc::new(StructuredStrategy::new(rules)?),
        StreamScheme::Legacy => Arc::new(LegacyHtmlStrategy::new(rules)?),
    };
    Ok(strategy)
}

/// Resolves stream candidates through the stream cache partition
pub struct StreamResolver {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<TtlCache<String, Vec<StreamCandidate>>>,
    strategy: Arc<dyn StreamStrategy>,
    base: Url,
    ttl: Duration,
}

impl StreamResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<TtlCache<String, Vec<StreamCandidate>>>,
        strategy: Arc<dyn StreamStrategy>,
        base: Url,
        ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            strategy,
            base,
            ttl,
        }
    }

    /// Candidates for an episode id, unique by url; never fails
    pub async fn resolve(&self, id: &str) -> Vec<StreamCandidate> {
        if !id.contains(EPISODE_DELIMITER) {
            debug!("Not an episode id: {}", id);
            return Vec::new();
        }

        let key = id.to_string();
        if let Some(cached) = self.cache.get(&key) {
            debug!("Stream cache hit: {}", id);
            return cached;
        }
        debug!("Stream cache miss: {}", id);

        let streams = match self.load(id).await {
            Ok(streams) => streams,
            Err(e) => {
                warn!("Streams for {} failed: {}", id, e);
                return Vec::new();
            }
        };

        if !streams.is_empty() {
            self.cache.set(key, streams.clone(), self.ttl);
        }
        info!(
            "Streams {} resolved {} candidates via {}",
            id,
            streams.len(),
            self.strategy.name()
        );
        streams
    }

    async fn load(&self, id: &str) -> Result<Vec<StreamCandidate>, ResolveError> {
        let (content, token) = EpisodeId::decode(id)?;
        let url = self
            .strategy
            .endpoint(&self.base, content.canonical_slug(), &token);
        let page = self.fetcher.fetch(&url).await?;
        let page_url = Url::parse(&url).unwrap_or_else(|_| self.base.clone());
        let candidates = self.strategy.parse(&page.body, &page_url)?;
        Ok(dedupe_by(candidates, |c| c.url.clone()))
    }
}
