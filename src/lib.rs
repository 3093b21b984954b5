// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cache;
pub mod cli;
pub mod source;
pub mod utils;
pub mod version;

pub use cache::{CacheStats, Clock, ManualClock, SystemClock, TtlCache};
pub use source::{
    AddonService, ContentDetail, ContentId, ContentKind, ContentSummary, EpisodeId,
    EpisodeSummary, ExtractionRules, ListingKind, PageFetcher, SourceConfig, StreamCandidate,
};
