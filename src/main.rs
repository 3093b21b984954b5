// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use animefire_addon::{
    api::start_server,
    source::{AddonService, ServerConfig, SourceConfig},
    version,
};
use anyhow::Result;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("📦 {}", version::get_version_string());

    let source_config = SourceConfig::from_env();
    if let Err(e) = source_config.validate() {
        anyhow::bail!("Invalid source configuration: {}", e);
    }
    let server_config = ServerConfig::from_env();

    tracing::info!(
        "Cache TTLs: catalog {}s, meta {}s, streams {}s",
        source_config.catalog_ttl_secs,
        source_config.meta_ttl_secs,
        source_config.stream_ttl_secs
    );
    if let Some(path) = &source_config.rules_path {
        tracing::info!("Extraction rules from {}", path.display());
    }

    let service = AddonService::new(source_config)?;
    start_server(service, &server_config).await
}
