// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    catalog_extra_handler, catalog_handler, health_handler, manifest_handler, meta_handler,
    not_found_handler, stream_handler,
};
use super::manifest::Manifest;
use crate::source::config::ServerConfig;
use crate::source::service::AddonService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AddonService>,
    pub manifest: Arc<Manifest>,
}

impl AppState {
    pub fn new(service: Arc<AddonService>) -> Self {
        Self {
            service,
            manifest: Arc::new(Manifest::build()),
        }
    }
}

/// Addon routes with CORS, tracing and panic recovery
pub fn create_router(service: Arc<AddonService>) -> Router {
    Router::new()
        .route("/manifest.json", get(manifest_handler))
        .route("/health", get(health_handler))
        .route("/catalog/:type/:id", get(catalog_handler))
        .route("/catalog/:type/:id/:extra", get(catalog_extra_handler))
        .route("/meta/:type/:id", get(meta_handler))
        .route("/stream/:type/:id", get(stream_handler))
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(AppState::new(service))
}

pub async fn start_server(service: AddonService, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_router(Arc::new(service));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 Addon server listening on {}", addr);
    tracing::info!("👉 Manifest: http://localhost:{}/manifest.json", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
