// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use animefire_addon::cache::Clock;
use animefire_addon::source::types::LOAD_FAILED_TITLE;
use std::sync::Arc;
use std::time::Duration;

use crate::common::*;

fn full_listing_url(slug: &str) -> String {
    format!("{BASE}/animes/{slug}-todos-os-episodios")
}

fn plain_url(slug: &str) -> String {
    format!("{BASE}/animes/{slug}")
}

#[tokio::test]
async fn test_full_detail_from_first_url_form() {
    let fetcher = Arc::new(MockFetcher::new().with_page(&full_listing_url("one-piece"), META_HTML));
    let clock = clock();
    let service = service(fetcher.clone(), clock.clone());

    let meta = service.meta("af_one-piece").await;

    assert_eq!(meta.id, "af_one-piece");
    assert_eq!(meta.title, "One Piece");
    assert_eq!(
        meta.poster_url.as_deref(),
        Some("https://animefire.io/img/animes/one-piece-large.webp")
    );
    assert_eq!(meta.background_url, meta.poster_url);
    assert_eq!(
        meta.description.as_deref(),
        Some("Monkey D. Luffy quer ser o Rei dos Piratas.")
    );
    assert_eq!(meta.release_info.as_deref(), Some("1999"));
    assert_eq!(meta.genres, vec!["Ação", "Aventura"]);

    let ids: Vec<_> = meta.episodes.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["af_one-piece:1", "af_one-piece:2", "af_one-piece:3"]);
    let numbers: Vec<_> = meta.episodes.iter().map(|e| e.episode_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(meta.episodes[2].title, "Especial de Natal");
    assert!(meta.episodes.iter().all(|e| e.season_number == 1));
    assert!(meta.episodes.iter().all(|e| e.released_at == clock.now()));

    assert_eq!(fetcher.calls(), vec![full_listing_url("one-piece")]);
}

#[tokio::test]
async fn test_catalog_derived_id_routes_to_canonical_slug() {
    let fetcher = Arc::new(MockFetcher::new().with_page(&full_listing_url("one-piece"), META_HTML));
    let service = service(fetcher.clone(), clock());

    let meta = service.meta("af_one-piece-todos-os-episodios").await;

    assert_eq!(meta.id, "af_one-piece-todos-os-episodios");
    assert_eq!(meta.title, "One Piece");
    assert_eq!(meta.episodes[0].id.as_str(), "af_one-piece-todos-os-episodios:1");
    assert_eq!(fetcher.calls(), vec![full_listing_url("one-piece")]);
}

#[tokio::test]
async fn test_falls_through_to_plain_url() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_status(&full_listing_url("bleach"), 404)
            .with_page(&plain_url("bleach"), META_NO_YEAR_HTML),
    );
    let service = service(fetcher.clone(), clock());

    let meta = service.meta("af_bleach").await;

    assert_eq!(meta.title, "Bleach");
    assert_eq!(fetcher.calls(), vec![full_listing_url("bleach"), plain_url("bleach")]);
}

#[tokio::test]
async fn test_missing_year_defaults_to_na() {
    let fetcher = Arc::new(MockFetcher::new().with_page(&full_listing_url("x"), META_NO_YEAR_HTML));
    let service = service(fetcher, clock());

    let meta = service.meta("af_x").await;

    assert_eq!(meta.release_info.as_deref(), Some("N/A"));
    assert_eq!(meta.title, "Bleach");
    assert_eq!(
        meta.description.as_deref(),
        Some("Ichigo ganha poderes de Shinigami.")
    );
    assert_eq!(meta.genres, vec!["Ação"]);

    let ids: Vec<_> = meta.episodes.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["af_x:1", "af_x:2"]);
    assert_eq!(meta.episodes[0].episode_number, 1);
    assert_eq!(meta.episodes[1].episode_number, 2);
    assert_eq!(meta.episodes[1].title, "Episódio 2");
}

#[tokio::test]
async fn test_repeated_year_row_keeps_last_and_inline_markup_is_joined() {
    let body = r#"
        <html><body>
          <h1>Re<span>:</span>Zero</h1>
          <div class="animeInfo"><span>Ano:</span> 2016</div>
          <div class="animeInfo"><span>Ano:</span> 2020</div>
        </body></html>
    "#;
    let fetcher = Arc::new(MockFetcher::new().with_page(&full_listing_url("re-zero"), body));
    let service = service(fetcher, clock());

    let meta = service.meta("af_re-zero").await;

    assert_eq!(meta.title, "Re:Zero");
    assert_eq!(meta.release_info.as_deref(), Some("2020"));
}

#[tokio::test]
async fn test_title_falls_back_to_slug() {
    let fetcher = Arc::new(
        MockFetcher::new().with_page(&full_listing_url("obscuro"), "<html><body></body></html>"),
    );
    let service = service(fetcher, clock());

    let meta = service.meta("af_obscuro").await;
    assert_eq!(meta.title, "obscuro");
    assert!(meta.episodes.is_empty());
    assert!(!meta.is_degraded());
}

#[tokio::test]
async fn test_second_call_within_ttl_fetches_once() {
    let fetcher = Arc::new(MockFetcher::new().with_page(&full_listing_url("one-piece"), META_HTML));
    let clock = clock();
    let service = service(fetcher.clone(), clock.clone());

    let first = service.meta("af_one-piece").await;
    clock.advance(Duration::from_secs(3600));
    let second = service.meta("af_one-piece").await;

    assert_eq!(first, second);
    assert_eq!(fetcher.call_count(), 1);

    clock.advance(Duration::from_secs(86400));
    service.meta("af_one-piece").await;
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_both_urls_failing_degrades_without_caching() {
    let fetcher = Arc::new(MockFetcher::new());
    let service = service(fetcher.clone(), clock());

    let meta = service.meta("af_missing").await;

    assert!(meta.is_degraded());
    assert_eq!(meta.id, "af_missing");
    assert_eq!(meta.title, LOAD_FAILED_TITLE);
    assert!(meta.poster_url.is_none());
    assert!(meta.episodes.is_empty());
    assert_eq!(fetcher.call_count(), 2);

    service.meta("af_missing").await;
    assert_eq!(fetcher.call_count(), 4);
    assert_eq!(service.cache_stats().meta.total, 0);
}

#[tokio::test]
async fn test_malformed_id_degrades_without_fetch() {
    let fetcher = Arc::new(MockFetcher::new());
    let service = service(fetcher.clone(), clock());

    let meta = service.meta("tt0388629").await;

    assert!(meta.is_degraded());
    assert_eq!(meta.id, "tt0388629");
    assert_eq!(fetcher.call_count(), 0);
}
