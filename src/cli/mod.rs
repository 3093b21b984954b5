// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod probe;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// AnimeFire addon CLI
#[derive(Parser, Debug)]
#[command(name = "animefire-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Probe the AnimeFire resolvers from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the release feed, or search with --search
    Catalog(probe::CatalogArgs),

    /// Resolve metadata for a content id (af_<slug>)
    Meta(probe::IdArgs),

    /// Resolve stream candidates for an episode id (af_<slug>:<token>)
    Streams(probe::IdArgs),

    /// Print the site search slug for a term
    Normalize(probe::NormalizeArgs),

    /// Print the effective extraction rules as TOML
    Rules,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Catalog(args) => probe::catalog(args).await,
        Commands::Meta(args) => probe::meta(args).await,
        Commands::Streams(args) => probe::streams(args).await,
        Commands::Normalize(args) => probe::normalize(args),
        Commands::Rules => probe::rules(),
    }
}
