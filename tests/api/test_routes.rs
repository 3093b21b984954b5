// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route tests for the addon HTTP surface
//!
//! Every request goes through the full router (CORS, tracing, panic
//! recovery) backed by a service over a canned fetcher.

use animefire_addon::api::create_router;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

use crate::common::*;

fn app(fetcher: Arc<MockFetcher>) -> Router {
    create_router(Arc::new(service(fetcher, clock())))
}

fn site() -> Arc<MockFetcher> {
    Arc::new(
        MockFetcher::new()
            .with_page(&releases_url(), LISTING_HTML)
            .with_page(&search_url("attack-on-titan"), SEARCH_HTML)
            .with_page(&format!("{BASE}/animes/one-piece-todos-os-episodios"), META_HTML)
            .with_page(&format!("{BASE}/video/one-piece/1?tempsubs=0"), STREAM_JSON),
    )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_manifest() {
    let (status, body) = get(app(site()), "/manifest.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "org.animefire.complete");
    assert_eq!(body["idPrefixes"][0], "af_");
    assert_eq!(body["catalogs"][0]["id"], "animefire_lancamentos");
    assert_eq!(body["catalogs"][1]["id"], "animefire_search");
    assert_eq!(body["catalogs"][1]["extra"][0]["name"], "search");
}

#[tokio::test]
async fn test_releases_catalog() {
    let (status, body) = get(app(site()), "/catalog/anime/animefire_lancamentos.json").await;

    assert_eq!(status, StatusCode::OK);
    let metas = body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 2);
    assert_eq!(metas[0]["id"], "af_one-piece-todos-os-episodios");
    assert_eq!(metas[0]["type"], "anime");
    assert_eq!(metas[0]["name"], "One Piece");
    assert_eq!(metas[1]["id"], "af_naruto-shippuden");
}

#[tokio::test]
async fn test_search_catalog_with_extra() {
    let fetcher = site();
    let (status, body) = get(
        app(fetcher.clone()),
        "/catalog/anime/animefire_search/search=Attack%20on%20Titan.json",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let metas = body["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 1);
    assert_eq!(metas[0]["name"], "Shingeki no Kyojin");
    assert_eq!(fetcher.calls_to(&search_url("attack-on-titan")), 1);
}

#[tokio::test]
async fn test_search_extra_is_decoded_once() {
    let fetcher = site();
    let (status, _) = get(
        app(fetcher.clone()),
        "/catalog/anime/animefire_search/search=Tom%20%26%20Jerry.json",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetcher.calls(), vec![search_url("tom--jerry")]);

    let fetcher = site();
    let _ = get(
        app(fetcher.clone()),
        "/catalog/anime/animefire_search/skip=0&search=1%2B1.json",
    )
    .await;
    assert_eq!(fetcher.calls(), vec![search_url("11")]);
}

#[tokio::test]
async fn test_search_catalog_without_term_is_empty() {
    let fetcher = site();
    let (status, body) = get(app(fetcher.clone()), "/catalog/anime/animefire_search.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metas"], Value::Array(Vec::new()));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_catalog_or_type_is_not_found() {
    let (status, body) = get(app(site()), "/catalog/anime/other.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["err"].as_str().unwrap().contains("other"));

    let (status, _) = get(app(site()), "/catalog/movie/animefire_lancamentos.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(site()), "/catalog/music/animefire_lancamentos.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_json_suffix_is_not_found() {
    let (status, _) = get(app(site()), "/catalog/anime/animefire_lancamentos").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(site()), "/meta/anime/af_one-piece").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_meta() {
    let (status, body) = get(app(site()), "/meta/anime/af_one-piece.json").await;

    assert_eq!(status, StatusCode::OK);
    let meta = &body["meta"];
    assert_eq!(meta["id"], "af_one-piece");
    assert_eq!(meta["name"], "One Piece");
    assert_eq!(meta["releaseInfo"], "1999");
    assert_eq!(meta["genres"], serde_json::json!(["Ação", "Aventura"]));
    let videos = meta["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 3);
    assert_eq!(videos[0]["id"], "af_one-piece:1");
    assert_eq!(videos[0]["season"], 1);
}

#[tokio::test]
async fn test_meta_failure_is_degraded_with_requested_type() {
    let (status, body) = get(app(site()), "/meta/series/af_unknown.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["id"], "af_unknown");
    assert_eq!(body["meta"]["type"], "series");
    assert_eq!(body["meta"]["name"], "Erro ao carregar meta");
    assert!(body["meta"].get("videos").is_none());
}

#[tokio::test]
async fn test_streams() {
    let (status, body) = get(app(site()), "/stream/anime/af_one-piece:1.json").await;

    assert_eq!(status, StatusCode::OK);
    let streams = body["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0]["title"], "🎬 AnimeFire (360p)");
    assert_eq!(
        streams[1]["url"],
        "https://lightspeedst.net/s1/mp4/one-piece/hd/1.mp4"
    );
}

#[tokio::test]
async fn test_streams_for_content_id_is_empty() {
    let fetcher = site();
    let (status, body) = get(app(fetcher.clone()), "/stream/anime/af_one-piece.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streams"], Value::Array(Vec::new()));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_health_reports_cache_partitions() {
    let app = app(site());
    let _ = get(app.clone(), "/catalog/anime/animefire_lancamentos.json").await;
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["caches"]["catalog"]["total"], 1);
    assert_eq!(body["caches"]["meta"]["total"], 0);
    assert_eq!(body["version"]["version"], "1.3.0");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, body) = get(app(site()), "/addon/whatever").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["err"].is_string());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/manifest.json")
        .header("origin", "https://web.stremio.com")
        .body(Body::empty())
        .unwrap();
    let response = app(site()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
