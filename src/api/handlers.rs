// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{OriginalUri, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use super::manifest::Manifest;
use crate::source::service::ServiceCacheStats;
use crate::source::types::{
    ContentDetail, ContentKind, ContentSummary, ListingKind, StreamCandidate,
};
use crate::utils::last_segment;

const JSON_SUFFIX: &str = ".json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub metas: Vec<ContentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaResponse {
    pub meta: ContentDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamCandidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: serde_json::Value,
    pub caches: ServiceCacheStats,
}

/// Drop the `.json` suffix every resource path carries
pub fn strip_json(segment: &str) -> Result<&str, ApiError> {
    segment
        .strip_suffix(JSON_SUFFIX)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::NotFound(format!("'{segment}' is not a JSON resource")))
}

/// `search` value of a form-encoded extra segment
///
/// `extra` must be the raw segment as sent, still percent-encoded, so that
/// an encoded `&` or `+` stays part of the value.
pub fn search_from_extra(extra: &str) -> Option<String> {
    url::form_urlencoded::parse(extra.as_bytes())
        .find(|(key, _)| key == "search")
        .map(|(_, value)| value.into_owned())
}

fn parse_kind(raw: &str) -> Result<ContentKind, ApiError> {
    raw.parse().map_err(ApiError::NotFound)
}

pub async fn manifest_handler(State(state): State<AppState>) -> Json<Manifest> {
    Json(state.manifest.as_ref().clone())
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::version::get_version_info(),
        caches: state.service.cache_stats(),
    })
}

pub async fn catalog_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let id = strip_json(&id)?;
    resolve_catalog(&state, &kind, id, None).await
}

pub async fn catalog_extra_handler(
    State(state): State<AppState>,
    Path((kind, id, _extra)): Path<(String, String, String)>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CatalogResponse>, ApiError> {
    // Path values are already percent-decoded; form-decode the raw segment once
    let raw_extra = last_segment(uri.path()).unwrap_or_default();
    let extra = strip_json(raw_extra)?;
    let search = search_from_extra(extra);
    resolve_catalog(&state, &kind, &id, search.as_deref()).await
}

async fn resolve_catalog(
    state: &AppState,
    kind: &str,
    id: &str,
    search: Option<&str>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let kind = parse_kind(kind)?;
    if !state.manifest.has_catalog(kind, id) {
        return Err(ApiError::NotFound(format!("catalog '{id}'")));
    }
    let listing: ListingKind = id.parse().map_err(ApiError::NotFound)?;

    debug!("Catalog request {} search={:?}", id, search);
    let metas = state.service.catalog(listing, search).await;
    Ok(Json(CatalogResponse { metas }))
}

pub async fn meta_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<MetaResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = strip_json(&id)?;

    let mut meta = state.service.meta(id).await;
    if meta.is_degraded() {
        meta.kind = kind;
    }
    Ok(Json(MetaResponse { meta }))
}

pub async fn stream_handler(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<StreamsResponse>, ApiError> {
    parse_kind(&kind)?;
    let id = strip_json(&id)?;

    let streams = state.service.streams(id).await;
    Ok(Json(StreamsResponse { streams }))
}

pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound("no such resource".to_string())
}
