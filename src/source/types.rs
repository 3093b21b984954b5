// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for content resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::fetcher::FetchError;
use super::ids::{ContentId, EpisodeId, IdentifierError};

/// Title given to a detail that could not be loaded
pub const LOAD_FAILED_TITLE: &str = "Erro ao carregar meta";

/// Kind of content as exposed to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Anime,
    Series,
    Movie,
}

impl ContentKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Series => "series",
            Self::Movie => "movie",
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anime" => Ok(Self::Anime),
            "series" => Ok(Self::Series),
            "movie" => Ok(Self::Movie),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

/// Which listing a catalog request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    /// The default feed of recent releases
    Releases,
    /// Free-text search; requires a term
    Search,
}

impl ListingKind {
    /// Catalog id advertised in the manifest
    pub fn catalog_id(&self) -> &'static str {
        match self {
            Self::Releases => "animefire_lancamentos",
            Self::Search => "animefire_search",
        }
    }
}

impl FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "animefire_lancamentos" => Ok(Self::Releases),
            "animefire_search" => Ok(Self::Search),
            other => Err(format!("unknown catalog '{other}'")),
        }
    }
}

/// One entry of a catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub id: ContentId,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "poster", skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(rename = "description")]
    pub blurb: String,
}

/// Full metadata for one piece of content
///
/// `id` echoes the requested identifier verbatim so that a degraded
/// detail can be returned even for malformed ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetail {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "poster", skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(rename = "background", skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_info: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(rename = "videos", default, skip_serializing_if = "Vec::is_empty")]
    pub episodes: Vec<EpisodeSummary>,
}

impl ContentDetail {
    /// Placeholder returned when metadata cannot be resolved
    pub fn degraded(id: &str, kind: ContentKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: LOAD_FAILED_TITLE.to_string(),
            poster_url: None,
            background_url: None,
            description: None,
            release_info: None,
            genres: Vec::new(),
            episodes: Vec::new(),
        }
    }

    /// Whether this is the load-failure placeholder
    pub fn is_degraded(&self) -> bool {
        self.title == LOAD_FAILED_TITLE && self.episodes.is_empty()
    }
}

/// One episode in a detail's video list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub id: EpisodeId,
    pub title: String,
    #[serde(rename = "episode")]
    pub episode_number: u32,
    #[serde(rename = "season")]
    pub season_number: u32,
    #[serde(rename = "released")]
    pub released_at: DateTime<Utc>,
}

/// A playable link candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCandidate {
    /// Human label, may embed a quality hint
    pub title: String,
    pub url: String,
}

/// Required data missing from an otherwise successful fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// A required field had no value
    #[error("required field '{field}' missing")]
    MissingField {
        /// Name of the field
        field: String,
    },

    /// The payload could not be read as the expected format
    #[error("unreadable payload: {reason}")]
    InvalidPayload {
        /// Parser message
        reason: String,
    },
}

/// Everything that can go wrong inside a resolution
///
/// Never crosses a resolver's public entry point: each resolver turns it
/// into an empty or degraded result.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    MalformedId(#[from] IdentifierError),
}
