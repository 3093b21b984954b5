// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use animefire_addon::source::types::LOAD_FAILED_TITLE;
use animefire_addon::source::{
    AddonService, ExtractionRules, ListingKind, ServiceError, SourceConfig,
};
use std::sync::Arc;
use std::time::Duration;

use crate::common::*;

#[tokio::test]
async fn test_always_failing_fetcher_yields_benign_results() {
    let service = service(Arc::new(FailingFetcher), clock());

    assert!(service.catalog(ListingKind::Releases, None).await.is_empty());
    assert!(service
        .catalog(ListingKind::Search, Some("naruto"))
        .await
        .is_empty());

    let meta = service.meta("af_naruto").await;
    assert_eq!(meta.id, "af_naruto");
    assert_eq!(meta.title, LOAD_FAILED_TITLE);
    assert!(meta.is_degraded());

    assert!(service.streams("af_naruto:1").await.is_empty());
}

#[tokio::test]
async fn test_panicking_fetcher_is_contained() {
    let service = service(Arc::new(PanickingFetcher), clock());

    assert!(service.catalog(ListingKind::Releases, None).await.is_empty());
    assert!(service.meta("af_naruto").await.is_degraded());
    assert!(service.streams("af_naruto:1").await.is_empty());

    // still serving afterwards
    assert!(service.meta("af_bleach").await.is_degraded());
}

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_page(&releases_url(), LISTING_HTML)
            .with_page(&format!("{BASE}/animes/one-piece-todos-os-episodios"), META_HTML)
            .with_page(&format!("{BASE}/video/one-piece/1?tempsubs=0"), STREAM_JSON),
    );
    let clock = clock();
    let service = service(fetcher.clone(), clock.clone());

    service.catalog(ListingKind::Releases, None).await;
    service.meta("af_one-piece").await;
    service.streams("af_one-piece:1").await;

    let stats = service.cache_stats();
    assert_eq!(stats.catalog.total, 1);
    assert_eq!(stats.meta.total, 1);
    assert_eq!(stats.streams.total, 1);

    // catalog (30 min) and streams (4 h) expire, meta (24 h) does not
    clock.advance(Duration::from_secs(5 * 3600));
    assert_eq!(service.purge_expired(), 2);
    assert_eq!(service.cache_stats().meta.total, 1);

    service.clear_caches();
    let stats = service.cache_stats();
    assert_eq!(stats.catalog.total + stats.meta.total + stats.streams.total, 0);
}

#[tokio::test]
async fn test_partitions_honour_capacity_bound() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_page(&format!("{BASE}/video/x/1?tempsubs=0"), STREAM_JSON)
            .with_page(&format!("{BASE}/video/x/2?tempsubs=0"), STREAM_JSON)
            .with_page(&format!("{BASE}/video/x/3?tempsubs=0"), STREAM_JSON),
    );
    let config = SourceConfig {
        max_cache_entries: Some(2),
        ..config()
    };
    let service = service_with(config, fetcher, clock());

    for id in ["af_x:1", "af_x:2", "af_x:3"] {
        service.streams(id).await;
    }

    let stats = service.cache_stats();
    assert_eq!(stats.streams.total, 2);
    assert_eq!(stats.streams.max, Some(2));
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config = SourceConfig {
        base_url: "not a url".to_string(),
        ..SourceConfig::default()
    };
    let result = AddonService::with_fetcher(
        config,
        &ExtractionRules::default(),
        Arc::new(FailingFetcher),
        clock(),
    );
    assert!(matches!(result, Err(ServiceError::Config(_))));
}
