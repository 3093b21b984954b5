// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Metadata resolution: content id → detail with ordered episodes

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::fetcher::{FetchError, FetchedPage, PageFetcher};
use super::ids::{ContentId, EpisodeId, EPISODE_DELIMITER, FULL_LISTING_SUFFIX};
use super::rules::{HtmlExtractor, HtmlRuleSet, Record, RuleError};
use super::types::{
    ContentDetail, ContentKind, EpisodeSummary, ExtractionError, ResolveError,
};
use crate::cache::{Clock, TtlCache};
use crate::utils::{dedupe_by, first_integer, last_segment, without_query};

/// Content pages live under this section
pub const CONTENT_SECTION: &str = "animes/";

/// The site has no seasons
pub const DEFAULT_SEASON: u32 = 1;

/// Page URLs for a canonical slug, in the order they are tried
pub fn meta_urls(base: &Url, canonical_slug: &str) -> Vec<String> {
    [
        format!("{CONTENT_SECTION}{canonical_slug}{FULL_LISTING_SUFFIX}"),
        format!("{CONTENT_SECTION}{canonical_slug}"),
    ]
    .into_iter()
    .map(|path| {
        base.join(&path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{base}{path}"))
    })
    .collect()
}

/// Episodes from extracted link records, in page order
///
/// The token is the link's last path segment; the episode number is the
/// first integer in the label, else the 1-based position. Links whose token
/// would break the id format are skipped and repeated ids keep the first.
pub fn episodes_from_records(
    content: &ContentId,
    records: &[Record],
    released_at: chrono::DateTime<chrono::Utc>,
) -> Vec<EpisodeSummary> {
    let episodes: Vec<EpisodeSummary> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let href = record.get("url")?;
            let token = last_segment(without_query(href))?;
            if token.contains(EPISODE_DELIMITER) {
                debug!("Skipping episode link {}: token contains delimiter", href);
                return None;
            }
            let id = EpisodeId::new(content, token).ok()?;
            let label = record.get("label").filter(|l| !l.is_empty());
            let position = u32::try_from(index + 1).unwrap_or(u32::MAX);

            Some(EpisodeSummary {
                id,
                title: label
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Episódio {token}")),
                episode_number: label.and_then(first_integer).unwrap_or(position),
                season_number: DEFAULT_SEASON,
                released_at,
            })
        })
        .collect();

    dedupe_by(episodes, |e| e.id.clone())
}

/// Resolves content details through the metadata cache partition
pub struct MetaResolver {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<TtlCache<String, ContentDetail>>,
    detail: HtmlExtractor,
    episodes: HtmlExtractor,
    base: Url,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MetaResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<TtlCache<String, ContentDetail>>,
        detail_rules: &HtmlRuleSet,
        episode_rules: &HtmlRuleSet,
        base: Url,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            fetcher,
            cache,
            detail: HtmlExtractor::compile(detail_rules)?,
            episodes: HtmlExtractor::compile(episode_rules)?,
            base,
            ttl,
            clock,
        })
    }

    /// Detail for a content id; a failure yields the degraded placeholder,
    /// which is never cached
    pub async fn resolve(&self, id: &str) -> ContentDetail {
        let key = id.to_string();
        if let Some(cached) = self.cache.get(&key) {
            debug!("Meta cache hit: {}", id);
            return cached;
        }
        debug!("Meta cache miss: {}", id);

        match self.load(id).await {
            Ok(detail) => {
                info!(
                    "Meta {} resolved: '{}' with {} episodes",
                    id,
                    detail.title,
                    detail.episodes.len()
                );
                self.cache.set(key, detail.clone(), self.ttl);
                detail
            }
            Err(e) => {
                warn!("Meta {} failed: {}", id, e);
                ContentDetail::degraded(id, ContentKind::Anime)
            }
        }
    }

    async fn load(&self, id: &str) -> Result<ContentDetail, ResolveError> {
        let content = ContentId::parse(id)?;
        let (url, page) = self.fetch_first(content.canonical_slug()).await?;
        let page_url = Url::parse(&url).unwrap_or_else(|_| self.base.clone());
        Ok(self.parse_page(id, &content, &page.body, &page_url)?)
    }

    async fn fetch_first(&self, slug: &str) -> Result<(String, FetchedPage), FetchError> {
        let mut last_error = None;
        for url in meta_urls(&self.base, slug) {
            match self.fetcher.fetch(&url).await {
                Ok(page) => return Ok((url, page)),
                Err(e) => {
                    debug!("Meta page {} unavailable: {}", url, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| FetchError::Http {
            url: slug.to_string(),
            message: "no page URL to try".to_string(),
        }))
    }

    fn parse_page(
        &self,
        id: &str,
        content: &ContentId,
        body: &str,
        page_url: &Url,
    ) -> Result<ContentDetail, ExtractionError> {
        let record = self.detail.extract_first(body, page_url)?;
        let episode_records = self.episodes.extract(body, page_url);
        let episodes = episodes_from_records(content, &episode_records, self.clock.now());

        let poster = record.get("poster").map(str::to_string);
        Ok(ContentDetail {
            id: id.to_string(),
            kind: ContentKind::Anime,
            title: record
                .get("title")
                .unwrap_or_else(|| content.slug())
                .to_string(),
            background_url: poster.clone(),
            poster_url: poster,
            description: record.get("description").map(str::to_string),
            release_info: record.get("year").map(str::to_string),
            genres: record.all("genres").to_vec(),
            episodes,
        })
    }
}
