// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Catalog resolution: listing page → deduplicated content summaries

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use url::Url;

use super::fetcher::PageFetcher;
use super::ids::ContentId;
use super::rules::{HtmlExtractor, HtmlRuleSet, Record, RuleError};
use super::types::{ContentKind, ContentSummary, ListingKind, ResolveError};
use crate::cache::TtlCache;
use crate::utils::{dedupe_by, without_query};

/// Path of the default release feed
pub const RELEASES_PATH: &str = "lista-de-animes-legendados";

/// Path prefix of search listings
pub const SEARCH_PATH: &str = "pesquisar/";

/// Id produced by the listing index link itself
pub const LISTING_ROOT_ID: &str = "af_animes";

/// Blurb attached to every summary
pub const SUMMARY_BLURB: &str = "Disponível no AnimeFire";

const CHROME_MARKERS: &[&str] = &["Ver todos", "Animes"];
const MIN_TITLE_CHARS: usize = 3;

/// Site search slug for a free-text term
///
/// Lower-cases, strips diacritics, turns every space into a hyphen and
/// drops anything outside `[a-z0-9-]`. Surrounding spaces are not trimmed.
pub fn normalize_search_term(term: &str) -> String {
    term.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == ' ' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Canonical listing URL for an already-normalized search term
pub fn listing_url(base: &Url, normalized_term: Option<&str>) -> String {
    let path = match normalized_term {
        Some(term) => format!("{SEARCH_PATH}{term}"),
        None => RELEASES_PATH.to_string(),
    };
    base.join(&path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("{}{}", base, path))
}

fn is_chrome_title(title: &str) -> bool {
    title.chars().count() < MIN_TITLE_CHARS
        || CHROME_MARKERS.iter().any(|marker| title.contains(marker))
}

/// Build summaries from extracted link records
///
/// Records with an unusable link are skipped; the rest are deduplicated by
/// id (first wins) before the listing-root link and navigation chrome are
/// filtered out.
pub fn summaries_from_records(records: Vec<Record>) -> Vec<ContentSummary> {
    let summaries: Vec<ContentSummary> = records
        .into_iter()
        .filter_map(|record| {
            let url = record.get("url")?;
            let title = record.get("title")?;
            let id = match ContentId::from_source_path(without_query(url)) {
                Ok(id) => id,
                Err(e) => {
                    debug!("Skipping catalog link {}: {}", url, e);
                    return None;
                }
            };
            Some(ContentSummary {
                id,
                kind: ContentKind::Anime,
                title: title.to_string(),
                poster_url: record.get("poster").map(str::to_string),
                blurb: SUMMARY_BLURB.to_string(),
            })
        })
        .collect();

    dedupe_by(summaries, |s| s.id.clone())
        .into_iter()
        .filter(|s| s.id.as_str() != LISTING_ROOT_ID && !is_chrome_title(&s.title))
        .collect()
}

/// Resolves catalog listings through the catalog cache partition
pub struct CatalogResolver {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<TtlCache<String, Vec<ContentSummary>>>,
    extractor: HtmlExtractor,
    base: Url,
    ttl: Duration,
}

impl CatalogResolver {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<TtlCache<String, Vec<ContentSummary>>>,
        rules: &HtmlRuleSet,
        base: Url,
        ttl: Duration,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            fetcher,
            cache,
            extractor: HtmlExtractor::compile(rules)?,
            base,
            ttl,
        })
    }

    /// Summaries for a listing; never fails
    ///
    /// A non-blank search term always searches. A search without a usable
    /// term is empty. An empty release feed is retried once against the
    /// site root. Only non-empty results are cached.
    pub async fn resolve(&self, listing: ListingKind, search: Option<&str>) -> Vec<ContentSummary> {
        let raw_term = search.filter(|s| !s.trim().is_empty());
        let term = raw_term.map(normalize_search_term);

        match (&term, listing) {
            (Some(t), _) if t.is_empty() => {
                debug!("Search term {:?} normalizes to nothing", raw_term);
                return Vec::new();
            }
            (None, ListingKind::Search) => {
                debug!("Search listing requested without a term");
                return Vec::new();
            }
            _ => {}
        }

        let url = listing_url(&self.base, term.as_deref());

        if let Some(cached) = self.cache.get(&url) {
            debug!("Catalog cache hit: {}", url);
            return cached;
        }
        debug!("Catalog cache miss: {}", url);

        let mut summaries = self.fetch_listing(&url).await.unwrap_or_else(|e| {
            warn!("Catalog listing {} failed: {}", url, e);
            Vec::new()
        });

        if summaries.is_empty() && term.is_none() {
            let root = self.base.to_string();
            info!("Release feed empty, falling back to {}", root);
            summaries = self.fetch_listing(&root).await.unwrap_or_else(|e| {
                warn!("Catalog fallback {} failed: {}", root, e);
                Vec::new()
            });
        }

        if !summaries.is_empty() {
            self.cache.set(url.clone(), summaries.clone(), self.ttl);
        }

        info!("Catalog {} resolved {} items", url, summaries.len());
        summaries
    }

    async fn fetch_listing(&self, url: &str) -> Result<Vec<ContentSummary>, ResolveError> {
        let page = self.fetcher.fetch(url).await?;
        let page_url = Url::parse(url).unwrap_or_else(|_| self.base.clone());
        let records = self.extractor.extract(&page.body, &page_url);
        debug!("{} link records on {}", records.len(), url);
        Ok(summaries_from_records(records))
    }
}
