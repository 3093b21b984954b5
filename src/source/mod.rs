// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content source module
//!
//! Resolves catalog listings, content metadata and stream links by
//! scraping the source site, with a TTL cache partition in front of each
//! resolver.
//!
//! ## Architecture
//!
//! - `ids`: content and episode identifier codec
//! - `rules`: declarative extraction tables and their interpreters
//! - `fetcher`: HTTP fetch capability
//! - `catalog` / `meta` / `stream`: the three resolvers
//! - `service`: panic-safe facade owning the cache partitions
//!
//! ## Usage
//!
//! ```ignore
//! let service = AddonService::new(SourceConfig::from_env())?;
//! let items = service.catalog(ListingKind::Search, Some("Attack on Titan")).await;
//! ```

pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod ids;
pub mod meta;
pub mod rules;
pub mod service;
pub mod stream;
pub mod types;

pub use catalog::{normalize_search_term, CatalogResolver};
pub use config::{ServerConfig, SourceConfig, StreamScheme};
pub use fetcher::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use ids::{ContentId, EpisodeId, IdentifierError};
pub use meta::MetaResolver;
pub use rules::{ExtractionRules, RuleError};
pub use service::{AddonService, ServiceCacheStats, ServiceError};
pub use stream::{LegacyHtmlStrategy, StreamResolver, StreamStrategy, StructuredStrategy};
pub use types::{
    ContentDetail, ContentKind, ContentSummary, EpisodeSummary, ExtractionError, ListingKind,
    ResolveError, StreamCandidate,
};
