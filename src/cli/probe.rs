// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::source::catalog::normalize_search_term;
use crate::source::config::SourceConfig;
use crate::source::rules::ExtractionRules;
use crate::source::service::AddonService;
use crate::source::types::ListingKind;

/// Arguments for the catalog command
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Free-text search term
    #[arg(long)]
    pub search: Option<String>,
}

/// Arguments for commands taking one identifier
#[derive(Args, Debug)]
pub struct IdArgs {
    /// Content or episode identifier
    pub id: String,
}

/// Arguments for the normalize command
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Term to normalize
    pub term: String,
}

fn build_service() -> Result<AddonService> {
    dotenv::dotenv().ok();
    let config = SourceConfig::from_env();
    info!("Using source {}", config.base_url);
    AddonService::new(config).context("failed to build addon service")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn catalog(args: CatalogArgs) -> Result<()> {
    let service = build_service()?;
    let listing = if args.search.is_some() {
        ListingKind::Search
    } else {
        ListingKind::Releases
    };
    let metas = service.catalog(listing, args.search.as_deref()).await;
    info!("{} items", metas.len());
    print_json(&metas)
}

pub async fn meta(args: IdArgs) -> Result<()> {
    let service = build_service()?;
    let meta = service.meta(&args.id).await;
    print_json(&meta)
}

pub async fn streams(args: IdArgs) -> Result<()> {
    let service = build_service()?;
    let streams = service.streams(&args.id).await;
    info!("{} candidates", streams.len());
    print_json(&streams)
}

pub fn normalize(args: NormalizeArgs) -> Result<()> {
    println!("{}", normalize_search_term(&args.term));
    Ok(())
}

pub fn rules() -> Result<()> {
    dotenv::dotenv().ok();
    let config = SourceConfig::from_env();
    let rules = ExtractionRules::resolve(config.rules_path.as_deref())?;
    print!("{}", rules.to_toml_string()?);
    Ok(())
}
